//! Input device snapshot types.
//!
//! - `JoyMessage` - wire shape of one device frame (`sensor_msgs/Joy` layout)
//! - `InputSnapshot` - validated, fixed-capacity copy of the latest frame
//! - `ButtonSet` - bitflag view of the buttons the node reacts to
//! - `InputError` - reasons a frame is rejected

use bitflags::bitflags;
use heapless::Vec as FixedVec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{
    AXIS_FORWARD, AXIS_SAFETY, AXIS_SELECT, AXIS_TURN, BUTTON_L1, BUTTON_R1, BUTTON_TRIANGLE,
    MAX_AXES, MAX_BUTTONS, MIN_AXES, MIN_BUTTONS, SAFETY_PRESSED_THRESHOLD,
};

/// Reasons an input frame cannot be turned into an [`InputSnapshot`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Frame carries fewer buttons than the node reads.
    #[error("frame has {got} buttons, need at least {need}")]
    TooFewButtons {
        /// Buttons present in the frame.
        got: usize,
        /// Minimum required.
        need: usize,
    },

    /// Frame carries fewer axes than the node reads.
    #[error("frame has {got} axes, need at least {need}")]
    TooFewAxes {
        /// Axes present in the frame.
        got: usize,
        /// Minimum required.
        need: usize,
    },

    /// Axis value is NaN or infinite.
    #[error("axis {index} is not a finite value")]
    NonFiniteAxis {
        /// Offending axis index.
        index: usize,
    },

    /// Frame could not be decoded at all.
    #[error("malformed input frame: {0}")]
    Malformed(String),
}

bitflags! {
    /// Buttons relevant to the safety state machine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ButtonSet: u8 {
        /// Triangle (hard stop).
        const TRIANGLE = 0x01;
        /// Left shoulder.
        const L1       = 0x02;
        /// Right shoulder.
        const R1       = 0x04;
    }
}

impl ButtonSet {
    /// Both shoulder buttons.
    pub const SHOULDERS: Self = Self::from_bits_truncate(Self::L1.bits() | Self::R1.bits());

    /// Combo that releases a latched hard stop: triangle + L1 + R1.
    pub const HARD_STOP_RELEASE: Self =
        Self::from_bits_truncate(Self::TRIANGLE.bits() | Self::SHOULDERS.bits());

    /// Triangle alone, both shoulders released.
    #[inline]
    pub const fn is_hard_stop(&self) -> bool {
        self.contains(Self::TRIANGLE) && !self.intersects(Self::SHOULDERS)
    }

    /// Triangle with both shoulders held.
    #[inline]
    pub const fn is_hard_stop_release(&self) -> bool {
        self.contains(Self::HARD_STOP_RELEASE)
    }
}

impl Default for ButtonSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// One frame as delivered by the device driver.
///
/// Buttons are integers (non-zero = pressed), axes are floats in `[-1.0, 1.0]`.
///
/// ```json
/// {"buttons": [0, 0, 1, 0, 0, 0], "axes": [0.0, 0.0, 1.0, 0.0, 0.5, -1.0, 0.0]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoyMessage {
    /// Button states.
    #[serde(default)]
    pub buttons: Vec<i32>,
    /// Axis values.
    #[serde(default)]
    pub axes: Vec<f32>,
}

/// Latest device state, validated and copied into fixed-capacity storage.
///
/// Indices carry fixed meaning (see [`crate::consts`]). Axis values are
/// clamped to `[-1.0, 1.0]`; entries beyond capacity are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSnapshot {
    buttons: FixedVec<bool, MAX_BUTTONS>,
    axes: FixedVec<f32, MAX_AXES>,
}

impl InputSnapshot {
    /// Controller at rest: no buttons, sticks centered, safety trigger released.
    pub fn neutral() -> Self {
        let mut buttons = FixedVec::new();
        let mut axes = FixedVec::new();
        for _ in 0..MIN_BUTTONS {
            let _ = buttons.push(false);
        }
        for idx in 0..=AXIS_SELECT {
            let _ = axes.push(if idx == AXIS_SAFETY { 1.0 } else { 0.0 });
        }
        Self { buttons, axes }
    }

    /// Build a snapshot from raw button and axis slices.
    ///
    /// # Errors
    /// Returns `InputError` if the frame is too short or any axis is not finite.
    pub fn from_parts(buttons: &[bool], axes: &[f32]) -> Result<Self, InputError> {
        if buttons.len() < MIN_BUTTONS {
            return Err(InputError::TooFewButtons {
                got: buttons.len(),
                need: MIN_BUTTONS,
            });
        }
        if axes.len() < MIN_AXES {
            return Err(InputError::TooFewAxes {
                got: axes.len(),
                need: MIN_AXES,
            });
        }
        if let Some(index) = axes.iter().position(|v| !v.is_finite()) {
            return Err(InputError::NonFiniteAxis { index });
        }

        let mut snapshot = Self {
            buttons: FixedVec::new(),
            axes: FixedVec::new(),
        };
        for &pressed in buttons.iter().take(MAX_BUTTONS) {
            let _ = snapshot.buttons.push(pressed);
        }
        for &value in axes.iter().take(MAX_AXES) {
            let _ = snapshot.axes.push(value.clamp(-1.0, 1.0));
        }
        Ok(snapshot)
    }

    /// Replace one button state, growing the frame if needed.
    pub fn with_button(mut self, index: usize, pressed: bool) -> Self {
        while self.buttons.len() <= index && self.buttons.push(false).is_ok() {}
        if let Some(slot) = self.buttons.get_mut(index) {
            *slot = pressed;
        }
        self
    }

    /// Replace one axis value (clamped), growing the frame if needed.
    pub fn with_axis(mut self, index: usize, value: f32) -> Self {
        while self.axes.len() <= index && self.axes.push(0.0).is_ok() {}
        if let Some(slot) = self.axes.get_mut(index) {
            *slot = if value.is_finite() {
                value.clamp(-1.0, 1.0)
            } else {
                0.0
            };
        }
        self
    }

    /// Button state; absent buttons read as released.
    #[inline]
    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    /// Axis value; absent axes read as centered.
    #[inline]
    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    /// Number of buttons in the frame.
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    /// Number of axes in the frame.
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Safety-relevant buttons currently pressed.
    pub fn pressed(&self) -> ButtonSet {
        let mut set = ButtonSet::empty();
        set.set(ButtonSet::TRIANGLE, self.button(BUTTON_TRIANGLE));
        set.set(ButtonSet::L1, self.button(BUTTON_L1));
        set.set(ButtonSet::R1, self.button(BUTTON_R1));
        set
    }

    /// Operator holds the safety enable trigger.
    #[inline]
    pub fn safety_pressed(&self) -> bool {
        self.axis(AXIS_SAFETY) <= SAFETY_PRESSED_THRESHOLD
    }

    /// Forward stick deflection.
    #[inline]
    pub fn forward(&self) -> f32 {
        self.axis(AXIS_FORWARD)
    }

    /// Turn stick deflection.
    #[inline]
    pub fn turn(&self) -> f32 {
        self.axis(AXIS_TURN)
    }

    /// Robot-select axis (d-pad horizontal).
    #[inline]
    pub fn select(&self) -> f32 {
        self.axis(AXIS_SELECT)
    }
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self::neutral()
    }
}

impl TryFrom<&JoyMessage> for InputSnapshot {
    type Error = InputError;

    fn try_from(msg: &JoyMessage) -> Result<Self, Self::Error> {
        let buttons: FixedVec<bool, MAX_BUTTONS> =
            msg.buttons.iter().take(MAX_BUTTONS).map(|&b| b != 0).collect();
        Self::from_parts(&buttons, &msg.axes)
    }
}
