//! Evaluation scopes
//!
//! Quantifiers, `for` loops, filters and function calls evaluate their
//! bodies in a child scope that adds bindings on top of the parent. The
//! parent is borrowed, never modified.

use verdict_core::{FeelContext, FeelValue};

pub(crate) enum Scope<'a> {
    /// Outermost bindings (the input context)
    Root(&'a FeelContext),
    /// Several bindings at once (function parameters, context entries)
    Frame {
        parent: &'a Scope<'a>,
        bindings: &'a FeelContext,
    },
    /// One binding (iteration variable, unary-test input)
    Binding {
        parent: &'a Scope<'a>,
        name: &'a str,
        value: FeelValue,
    },
}

impl<'a> Scope<'a> {
    pub fn lookup(&self, name: &str) -> Option<&FeelValue> {
        match self {
            Scope::Root(map) => map.get(name),
            Scope::Frame { parent, bindings } => {
                bindings.get(name).or_else(|| parent.lookup(name))
            }
            Scope::Binding {
                parent,
                name: bound,
                value,
            } => {
                if *bound == name {
                    Some(value)
                } else {
                    parent.lookup(name)
                }
            }
        }
    }

    pub fn bind<'b>(&'b self, name: &'b str, value: FeelValue) -> Scope<'b>
    where
        'a: 'b,
    {
        Scope::Binding {
            parent: self,
            name,
            value,
        }
    }

    pub fn frame<'b>(&'b self, bindings: &'b FeelContext) -> Scope<'b>
    where
        'a: 'b,
    {
        Scope::Frame {
            parent: self,
            bindings,
        }
    }

    /// Every visible binding, inner ones shadowing outer ones
    pub fn flatten(&self) -> FeelContext {
        let mut out = FeelContext::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut FeelContext) {
        match self {
            Scope::Root(map) => out.extend(map.iter().map(|(k, v)| (k.clone(), v.clone()))),
            Scope::Frame { parent, bindings } => {
                parent.collect_into(out);
                out.extend(bindings.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Scope::Binding {
                parent,
                name,
                value,
            } => {
                parent.collect_into(out);
                out.insert(name.to_string(), value.clone());
            }
        }
    }
}
