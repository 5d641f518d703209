use alloc::rc::Rc;
use std::{collections::BTreeSet, fmt::Display};

/// Owning handle to a term node. Several parents may hold the same node
/// after substitution, so every handle counts as one reference.
pub type Link = Rc<Term>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Var(char),
    Lam(char, Link),
    App(Link, Link),
}

impl Term {
    pub fn var(name: char) -> Link {
        Rc::new(Term::Var(name))
    }

    pub fn lam(name: char, body: Link) -> Link {
        Rc::new(Term::Lam(name, body))
    }

    pub fn app(function: Link, argument: Link) -> Link {
        Rc::new(Term::App(function, argument))
    }

    pub fn is_app(&self) -> bool {
        matches!(self, Term::App(_, _))
    }

    pub fn is_lam(&self) -> bool {
        matches!(self, Term::Lam(_, _))
    }

    pub fn free_vars(&self) -> BTreeSet<char> {
        let mut free = BTreeSet::new();
        self.collect_free(&mut Vec::new(), &mut free);
        free
    }

    fn collect_free(&self, bound: &mut Vec<char>, free: &mut BTreeSet<char>) {
        match self {
            Term::Var(name) => {
                if !bound.contains(name) {
                    free.insert(*name);
                }
            }
            Term::Lam(name, body) => {
                bound.push(*name);
                body.collect_free(bound, free);
                bound.pop();
            }
            Term::App(function, argument) => {
                function.collect_free(bound, free);
                argument.collect_free(bound, free);
            }
        }
    }
}

/// Releases the node behind `link` but not its children: they are moved out
/// when `link` was the last reference, and retained otherwise.
pub fn release_node(link: Link) -> Term {
    Rc::try_unwrap(link).unwrap_or_else(|shared| Term::clone(&shared))
}

/// Splits an abstraction into its binder and body, freeing only the wrapper.
/// Anything else is handed back untouched.
pub fn split_lam(link: Link) -> Result<(char, Link), Link> {
    if !link.is_lam() {
        return Err(link);
    }

    match release_node(link) {
        Term::Lam(name, body) => Ok((name, body)),
        other => Err(Rc::new(other)),
    }
}

pub fn split_app(link: Link) -> Result<(Link, Link), Link> {
    if !link.is_app() {
        return Err(link);
    }

    match release_node(link) {
        Term::App(function, argument) => Ok((function, argument)),
        other => Err(Rc::new(other)),
    }
}

// Applications are printed by plain juxtaposition, mirroring the grammar.
impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Var(name) => write!(f, "{name}"),
            Term::Lam(name, body) => write!(f, "({name}.{body})"),
            Term::App(function, argument) => write!(f, "{function}{argument}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> Link {
        Term::lam('x', Term::var('x'))
    }

    #[test]
    fn test_print() {
        assert_eq!(Term::var('x').to_string(), "x");
        assert_eq!(id().to_string(), "(x.x)");

        let term = Term::app(Term::app(id(), Term::var('y')), Term::var('z'));
        assert_eq!(term.to_string(), "(x.x)yz");
    }

    #[test]
    fn test_print_does_not_parenthesize_nested_application() {
        let term = Term::app(Term::var('f'), Term::app(Term::var('g'), Term::var('x')));
        assert_eq!(term.to_string(), "fgx");
    }

    #[test]
    fn test_free_vars() {
        let term = Term::lam(
            'x',
            Term::app(Term::app(Term::var('x'), Term::var('y')), Term::lam('y', Term::var('z'))),
        );
        assert_eq!(term.free_vars(), BTreeSet::from(['y', 'z']));
        assert!(id().free_vars().is_empty());
    }

    #[test]
    fn test_release_node_moves_children_of_unique_node() {
        let body = Term::var('x');
        let weak = Rc::downgrade(&body);
        let lam = Term::lam('x', body);

        let (name, body) = split_lam(lam).expect("abstraction");
        assert_eq!(name, 'x');
        assert_eq!(weak.strong_count(), 1);
        drop(body);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_release_node_retains_children_of_shared_node() {
        let body = Term::var('x');
        let weak = Rc::downgrade(&body);
        let lam = Term::lam('x', body);
        let other_parent = Rc::clone(&lam);

        let (_, body) = split_lam(lam).expect("abstraction");
        assert_eq!(weak.strong_count(), 2);
        drop(other_parent);
        assert_eq!(weak.strong_count(), 1);
        drop(body);
        assert_eq!(weak.strong_count(), 0);
    }

    #[test]
    fn test_split_rejects_other_shapes() {
        let var = Term::var('x');
        assert!(split_lam(Rc::clone(&var)).is_err());
        assert!(split_app(var).is_err());

        let (function, argument) =
            split_app(Term::app(id(), Term::var('y'))).expect("application");
        assert_eq!(function, id());
        assert_eq!(argument, Term::var('y'));
    }
}
