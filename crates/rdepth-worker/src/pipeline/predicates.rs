//! Admission predicates, cheapest first.

use rdepth_models::{PassFilterSet, RejectionReason, SampleDescriptor, TimeOfDay};

use crate::filter_config::{FilterConfiguration, SpeedBound};

/// Weather/time-of-day admission.
///
/// | Filters | Admitted scenes |
/// |---|---|
/// | day | day without rain |
/// | night | night without rain |
/// | rain | any rain |
/// | day, night | no rain |
/// | day, rain | day |
/// | night, rain | night |
/// | day, night, rain | all |
pub fn admits_weather(filters: PassFilterSet, time_of_day: TimeOfDay, rain: bool) -> bool {
    let day = time_of_day == TimeOfDay::Day;
    let night = time_of_day == TimeOfDay::Night;
    match (filters.day, filters.night, filters.rain) {
        (true, false, false) => day && !rain,
        (false, true, false) => night && !rain,
        (false, false, true) => rain,
        (true, true, false) => !rain,
        (true, false, true) => day,
        (false, true, true) => night,
        (true, true, true) => true,
        (false, false, false) => false,
    }
}

pub fn admits_keyframe(use_keyframe: bool, sample: &SampleDescriptor) -> bool {
    !use_keyframe || sample.is_key_frame
}

pub fn admits_speed(bound: SpeedBound, sample: &SampleDescriptor) -> bool {
    bound.contains(sample.ego_speed)
}

/// Run the sample-level predicates in order and return the first failure.
pub fn first_rejection(
    config: &FilterConfiguration,
    time_of_day: TimeOfDay,
    rain: bool,
    sample: &SampleDescriptor,
) -> Option<RejectionReason> {
    if !admits_weather(config.pass_filters(), time_of_day, rain) {
        return Some(RejectionReason::WeatherMismatch);
    }
    if !admits_keyframe(config.use_keyframe(), sample) {
        return Some(RejectionReason::NotKeyframe);
    }
    if !admits_speed(config.speed_bound(), sample) {
        return Some(RejectionReason::SpeedOutOfBound);
    }
    None
}
