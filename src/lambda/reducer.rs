use alloc::rc::Rc;

use tracing::{debug, trace, warn};

use super::term::{split_app, split_lam, Link, Term};

/// How a bound variable is replaced during a beta step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Substitution {
    /// Textual replacement. A free variable of the argument can be captured
    /// by a binder of the same name inside the body.
    #[default]
    Naive,
    /// Renames binders that would capture a free variable of the argument.
    CaptureAvoiding,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reducer {
    substitution: Substitution,
}

impl Reducer {
    pub fn new(substitution: Substitution) -> Self {
        Reducer { substitution }
    }

    pub fn substitute(&self, term: Link, target: char, replacement: &Link) -> Link {
        match self.substitution {
            Substitution::Naive => substitute(term, target, replacement),
            Substitution::CaptureAvoiding => substitute_avoiding(term, target, replacement),
        }
    }

    /// Contracts `function argument`. A function which is not an abstraction
    /// is stuck: the argument is released and the function comes back as is.
    pub fn beta_reduce(&self, function: Link, argument: Link) -> Link {
        match split_lam(function) {
            Ok((name, body)) => {
                let result = self.substitute(body, name, &argument);
                drop(argument);
                result
            }
            Err(function) => {
                debug!(%function, %argument, "stuck application");
                function
            }
        }
    }

    /// Drives the function position of the spine to a variable or an
    /// abstraction, then performs exactly one beta step at the top.
    pub fn apply_leftmost(&self, term: Link) -> Link {
        match split_app(term) {
            Ok((mut function, argument)) => {
                while function.is_app() {
                    function = self.apply_leftmost(function);
                }
                self.beta_reduce(function, argument)
            }
            Err(term) => term,
        }
    }

    /// Normal-order reduction. `on_step` sees every application right before
    /// it is contracted and can stop the reduction by returning an error;
    /// nothing else bounds it, so a term without normal form never returns.
    pub fn normalize<E>(
        &self,
        mut term: Link,
        on_step: &mut impl FnMut(&Term) -> Result<(), E>,
    ) -> Result<Link, E> {
        while term.is_app() {
            on_step(&term)?;
            term = self.apply_leftmost(term);
            debug!(%term, "reduction step");
        }

        match split_lam(term) {
            Ok((name, body)) => Ok(Term::lam(name, self.normalize(body, on_step)?)),
            Err(term) => Ok(term),
        }
    }
}

/// Replaces every free occurrence of `target` in `term` with a new reference
/// to `replacement`. Binders are not renamed. Untouched subgraphs are handed
/// back as the same node.
pub fn substitute(term: Link, target: char, replacement: &Link) -> Link {
    let rebuilt = match &*term {
        Term::Var(name) if *name == target => Some(Rc::clone(replacement)),
        Term::Var(_) => None,
        Term::Lam(name, _) if *name == target => None,
        Term::Lam(name, body) => {
            let new_body = substitute(Rc::clone(body), target, replacement);
            (!Rc::ptr_eq(&new_body, body)).then(|| Term::lam(*name, new_body))
        }
        Term::App(function, argument) => {
            let new_function = substitute(Rc::clone(function), target, replacement);
            let new_argument = substitute(Rc::clone(argument), target, replacement);
            (!Rc::ptr_eq(&new_function, function) || !Rc::ptr_eq(&new_argument, argument))
                .then(|| Term::app(new_function, new_argument))
        }
    };

    rebuilt.unwrap_or(term)
}

fn substitute_avoiding(term: Link, target: char, replacement: &Link) -> Link {
    let rebuilt = match &*term {
        Term::Var(name) if *name == target => Some(Rc::clone(replacement)),
        Term::Var(_) => None,
        Term::Lam(name, _) if *name == target => None,
        Term::Lam(name, body) => {
            let free_in_replacement = replacement.free_vars();
            let free_in_body = body.free_vars();

            if free_in_replacement.contains(name) && free_in_body.contains(&target) {
                let fresh = ('a'..='z').chain('A'..='Z').find(|c| {
                    *c != target && !free_in_replacement.contains(c) && !free_in_body.contains(c)
                });

                match fresh {
                    Some(fresh) => {
                        trace!(from = %name, to = %fresh, "renaming binder");
                        let renamed =
                            substitute_avoiding(Rc::clone(body), *name, &Term::var(fresh));
                        Some(Term::lam(
                            fresh,
                            substitute_avoiding(renamed, target, replacement),
                        ))
                    }
                    None => {
                        warn!(binder = %name, "no fresh name left, substituting naively");
                        let new_body = substitute(Rc::clone(body), target, replacement);
                        Some(Term::lam(*name, new_body))
                    }
                }
            } else {
                let new_body = substitute_avoiding(Rc::clone(body), target, replacement);
                (!Rc::ptr_eq(&new_body, body)).then(|| Term::lam(*name, new_body))
            }
        }
        Term::App(function, argument) => {
            let new_function = substitute_avoiding(Rc::clone(function), target, replacement);
            let new_argument = substitute_avoiding(Rc::clone(argument), target, replacement);
            (!Rc::ptr_eq(&new_function, function) || !Rc::ptr_eq(&new_argument, argument))
                .then(|| Term::app(new_function, new_argument))
        }
    };

    rebuilt.unwrap_or(term)
}
