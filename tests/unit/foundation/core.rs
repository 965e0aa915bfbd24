use super::*;

#[test]
fn beat_address_formats_act_shot_beat() {
    let addr = BeatAddress {
        act: 2,
        shot: 0,
        beat: 3,
    };
    assert_eq!(addr.to_string(), "act 2 / shot 0 / beat 3");
}

#[test]
fn step_index_orders_numerically() {
    assert!(StepIndex(2) > StepIndex(1));
    assert_eq!(StepIndex(7), StepIndex(7));
}
