//! "Next value" controls used by the on-device menus.

use super::{
    fields::Scalar,
    schema::{Cycle, GpsHardware, ItemDef},
};
use crate::sysc::{ConfigError, ConfigResult};

/// Value that follows `current` for `item`.
///
/// Choice sequences skip values the attached receiver cannot use, and a current value
/// that is not part of the sequence moves to its first element.
pub fn next_value(item: &ItemDef, current: &Scalar, hw: GpsHardware) -> ConfigResult<Scalar> {
    match (item.cycle, current) {
        (Cycle::Flip, Scalar::Bool(flag)) => Ok(Scalar::Bool(!flag)),
        (Cycle::Choices, Scalar::Int(value)) => {
            let sequence = item
                .choices
                .iter()
                .filter(|choice| choice.available(hw))
                .map(|choice| i64::from(choice.value))
                .collect::<Vec<_>>();

            let first = *sequence.first().ok_or(ConfigError::NotCyclic(item.name))?;
            let next = sequence
                .iter()
                .position(|candidate| candidate == value)
                .and_then(|pos| sequence.get(pos + 1))
                .copied()
                .unwrap_or(first);

            Ok(Scalar::Int(next))
        }
        (Cycle::Step { min, max }, Scalar::Int(value)) => {
            let (min, max) = (i64::from(min), i64::from(max));

            if *value < min || *value >= max {
                Ok(Scalar::Int(min))
            } else {
                Ok(Scalar::Int(value + 1))
            }
        }
        _ => Err(ConfigError::NotCyclic(item.name)),
    }
}

/// Flip bit `pos` of a bitmask item's value.
pub fn toggle_bit(item: &ItemDef, current: &Scalar, pos: u8) -> ConfigResult<Scalar> {
    let (Cycle::Bits, Scalar::Int(value)) = (item.cycle, current) else {
        return Err(ConfigError::NotCyclic(item.name));
    };

    let toggle = item
        .toggles
        .iter()
        .find(|toggle| toggle.pos == pos)
        .ok_or(ConfigError::NoSuchToggle {
            name: item.name,
            pos,
        })?;

    Ok(Scalar::Int(value ^ i64::from(toggle.mask())))
}
