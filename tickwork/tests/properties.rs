use proptest::prelude::*;
use tickwork::{Completer, Driver, Error, Step, Yield, routine};

proptest! {
    #[test]
    fn state_queries_are_stable_after_completion(
        succeed in any::<bool>(),
        value in any::<u32>(),
        polls in 1usize..50,
    ) {
        let completer = Completer::new();
        let promise = completer.promise();

        if succeed {
            completer.succeed(value);
        } else {
            completer.fail(Error::Message(value.to_string()));
        }

        for _ in 0..polls {
            prop_assert!(promise.is_done());
            prop_assert_eq!(promise.succeeded(), succeed);
            prop_assert_eq!(promise.failed(), !succeed);
            prop_assert_eq!(promise.value().copied(), succeed.then_some(value));
            prop_assert_eq!(promise.error().is_some(), !succeed);
        }
    }

    #[test]
    fn typed_driver_completes_after_waits_plus_one(waits in 0usize..40, value in any::<i64>()) {
        let steps = (0..waits).map(|_| Yield::NotYet).chain([Yield::Return(value)]);
        let mut driver = Driver::wrap_typed(Completer::new(), routine::from_iter(steps));
        let promise = driver.promise();

        let mut host_steps = 1;
        while !driver.step().is_done() {
            host_steps += 1;
        }

        prop_assert_eq!(host_steps, waits + 1);
        prop_assert_eq!(driver.advancements(), waits + 1);
        prop_assert_eq!(promise.value().copied(), Some(value));
    }
}
