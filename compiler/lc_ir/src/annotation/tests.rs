use super::*;

#[test]
fn test_meet_requires_all_top() {
    assert_eq!(Annotation::Top.meet(Annotation::Top), Annotation::Top);
    assert_eq!(Annotation::Top.meet(Annotation::Bot), Annotation::Bot);
    assert_eq!(
        Annotation::meet_all([Annotation::Top, Annotation::Top, Annotation::Bot]),
        Annotation::Bot
    );
    assert_eq!(Annotation::meet_all([]), Annotation::Top);
}

#[test]
fn test_join_any_top() {
    assert_eq!(Annotation::Bot.join(Annotation::Top), Annotation::Top);
    assert_eq!(Annotation::Bot.join(Annotation::Bot), Annotation::Bot);
    assert_eq!(Annotation::join_all([]), Annotation::Bot);
}

#[test]
fn test_order() {
    assert!(Annotation::Bot.leq(Annotation::Top));
    assert!(!Annotation::Top.leq(Annotation::Bot));
    assert!(Annotation::Top.is_top());
    assert!(Annotation::Bot.is_bot());
    assert_eq!(Annotation::from(true), Annotation::Top);
}

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_laws {
    use super::super::{Annotation, Lattice};
    use proptest::prelude::*;

    fn annotation() -> impl Strategy<Value = Annotation> {
        any::<bool>().prop_map(Annotation::from)
    }

    proptest! {
        #[test]
        fn idempotent(a in annotation()) {
            prop_assert_eq!(a.join(a), a);
            prop_assert_eq!(a.meet(a), a);
        }

        #[test]
        fn commutative(a in annotation(), b in annotation()) {
            prop_assert_eq!(a.join(b), b.join(a));
            prop_assert_eq!(a.meet(b), b.meet(a));
        }

        #[test]
        fn associative(a in annotation(), b in annotation(), c in annotation()) {
            prop_assert_eq!(a.join(b).join(c), a.join(b.join(c)));
            prop_assert_eq!(a.meet(b).meet(c), a.meet(b.meet(c)));
        }

        #[test]
        fn join_monotone(a in annotation(), b in annotation(), c in annotation()) {
            if a.leq(b) {
                prop_assert!(a.join(c).leq(b.join(c)));
            }
        }

        #[test]
        fn absorption(a in annotation(), b in annotation()) {
            prop_assert_eq!(a.join(a.meet(b)), a);
            prop_assert_eq!(a.meet(a.join(b)), a);
        }
    }
}
