/// A declared failure category: a predicate over error values.
pub trait Category<E> {
    fn matches(&self, error: &E) -> bool;
}

/// Category backed by a predicate closure.
#[derive(Clone, Copy, Debug)]
pub struct When<F>(pub F);

impl<E, F> Category<E> for When<F>
where
    F: Fn(&E) -> bool,
{
    fn matches(&self, error: &E) -> bool { (self.0)(error) }
}

/// Matches when any member category matches.
impl<E, C, const N: usize> Category<E> for [C; N]
where
    C: Category<E>,
{
    fn matches(&self, error: &E) -> bool { self.iter().any(|category| category.matches(error)) }
}

impl<E, C> Category<E> for &C
where
    C: Category<E> + ?Sized,
{
    fn matches(&self, error: &E) -> bool { (**self).matches(error) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_when_uses_predicate() {
        let even = When(|n: &i32| n % 2 == 0);
        assert!(even.matches(&4));
        assert!(!even.matches(&3));
    }

    #[test]
    fn test_array_matches_any_member() {
        let small: [When<fn(&i32) -> bool>; 2] = [When(|n: &i32| *n == 1), When(|n: &i32| *n == 2)];
        assert!(small.matches(&1));
        assert!(small.matches(&2));
        assert!(!small.matches(&3));
    }

    #[test]
    fn test_empty_array_matches_nothing() {
        let none: [When<fn(&i32) -> bool>; 0] = [];
        assert!(!none.matches(&0));
    }

    #[test]
    fn test_reference_delegates() {
        let even = When(|n: &i32| n % 2 == 0);
        let by_ref = &even;
        assert!(by_ref.matches(&2));
    }
}
