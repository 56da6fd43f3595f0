// tests/display_properties.rs

use std::path::PathBuf;

use proptest::prelude::*;

use buildwatch::engine::{AggregatorOptions, DisplayState, SupervisorEvent};
use buildwatch::types::{CommandResult, Status};
use buildwatch::watch::SourceFilter;

fn final_status() -> impl Strategy<Value = Status> {
    prop_oneof![Just(Status::Ok), Just(Status::Bad)]
}

fn event_strategy() -> impl Strategy<Value = SupervisorEvent> {
    prop_oneof![
        prop_oneof![Just("a.go"), Just("pkg/b.go"), Just("README.md"), Just("go.mod")]
            .prop_map(|p| SupervisorEvent::FileChanged(PathBuf::from("/proj").join(p))),
        (final_status(), "[a-z]{0,8}")
            .prop_map(|(s, out)| SupervisorEvent::BuildFinished(CommandResult::new("Build", out, s))),
        (final_status(), "[a-z]{0,8}")
            .prop_map(|(s, out)| SupervisorEvent::TestFinished(CommandResult::new("Test", out, s))),
        Just(SupervisorEvent::WatchError("boom".to_string())),
    ]
}

fn is_source_change(event: &SupervisorEvent) -> bool {
    matches!(event, SupervisorEvent::FileChanged(p) if p.extension().is_some_and(|e| e == "go"))
}

proptest! {
    #[test]
    fn status_never_flips_between_ok_and_bad(
        events in proptest::collection::vec(event_strategy(), 0..40)
    ) {
        let filter = SourceFilter::new("/proj", ["go"], &[]).unwrap();
        let mut state = DisplayState::new("Build", "Test", filter, AggregatorOptions::default());

        for event in events {
            let before = (state.build().status, state.test().status);
            let source_change = is_source_change(&event);
            let step = state.step(event);
            let after = (state.build().status, state.test().status);

            if source_change {
                prop_assert!(step.restart);
                prop_assert_eq!(after, (Status::Dirty, Status::Dirty));
                continue;
            }

            prop_assert!(!step.restart);
            prop_assert!(step.keep_running);

            // Only a Dirty slot may change, and only to a final status.
            for (b, a) in [(before.0, after.0), (before.1, after.1)] {
                if b != Status::Dirty {
                    prop_assert_eq!(a, b);
                }
            }
        }
    }
}
