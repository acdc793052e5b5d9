//! Axis registry.
//!
//! Twelve channels created once at start-up from the axis table: the
//! carriage, the band and ten pumps. Static settings never change after
//! `initialize`; live position and speed belong to the motion primitive.

use mixmate_common::consts::{AXIS_COUNT, BAND_AXIS, CARRIAGE_AXIS};
use mixmate_common::control_unit::config::AxisConfig;
use mixmate_common::control_unit::state::AxisRole;
use mixmate_common::hal::{AxisHardware, DriverConfigurator, HalError, MotionPrimitive};
use mixmate_common::protocol::PumpId;
use tracing::{debug, info};

/// One axis: identity, static settings and its collaborators.
pub struct AxisChannel {
    role: AxisRole,
    config: AxisConfig,
    motor: Box<dyn MotionPrimitive>,
    driver: Box<dyn DriverConfigurator>,
}

impl AxisChannel {
    /// What this channel drives.
    #[inline]
    pub fn role(&self) -> AxisRole {
        self.role
    }

    /// Registry index.
    #[inline]
    pub fn index(&self) -> usize {
        self.role.index()
    }

    /// Static settings from the axis table.
    #[inline]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Motion primitive, read-only.
    #[inline]
    pub fn motor(&self) -> &dyn MotionPrimitive {
        self.motor.as_ref()
    }

    /// Motion primitive.
    #[inline]
    pub fn motor_mut(&mut self) -> &mut dyn MotionPrimitive {
        self.motor.as_mut()
    }

    /// Re-apply the table's max speed and acceleration.
    pub fn apply_profile(&mut self) {
        self.motor.set_max_speed(self.config.max_speed);
        self.motor.set_acceleration(self.config.acceleration);
    }

    /// True while the primitive has distance or speed left.
    pub fn is_moving(&self) -> bool {
        self.motor.distance_to_go() != 0 || self.motor.speed() != 0.0
    }

    fn bring_up(&mut self) -> Result<(), HalError> {
        self.driver.apply(&self.config.driver_settings())?;
        self.apply_profile();
        self.motor.set_speed(0.0);
        let here = self.motor.current_position();
        self.motor.move_to(here);
        debug!(axis = %self.role, max_speed = self.config.max_speed, "axis ready");
        Ok(())
    }
}

impl std::fmt::Debug for AxisChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxisChannel")
            .field("role", &self.role)
            .field("config", &self.config)
            .field("position", &self.motor.current_position())
            .finish_non_exhaustive()
    }
}

/// Fixed set of axis channels in registry order.
#[derive(Debug)]
pub struct AxisRegistry {
    channels: Vec<AxisChannel>,
}

impl AxisRegistry {
    /// Configure every driver and motion primitive, in registry order.
    ///
    /// Fails on the first driver that rejects its settings.
    pub fn initialize(configs: &[AxisConfig], hardware: Vec<AxisHardware>) -> Result<Self, HalError> {
        if configs.len() != AXIS_COUNT || hardware.len() != AXIS_COUNT {
            return Err(HalError::InitFailed(format!(
                "expected {AXIS_COUNT} axes, got {} configs and {} hardware slots",
                configs.len(),
                hardware.len()
            )));
        }

        let mut channels = Vec::with_capacity(AXIS_COUNT);
        for (index, (config, hw)) in configs.iter().zip(hardware).enumerate() {
            let role = AxisRole::from_index(index)
                .ok_or_else(|| HalError::InitFailed(format!("no role for axis {index}")))?;
            let mut channel = AxisChannel {
                role,
                config: *config,
                motor: hw.motor,
                driver: hw.driver,
            };
            channel.bring_up()?;
            channels.push(channel);
        }

        info!(axes = channels.len(), "Axis registry initialized");
        Ok(Self { channels })
    }

    /// Channel by registry index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&AxisChannel> {
        self.channels.get(index)
    }

    /// Linear carriage.
    #[inline]
    pub fn carriage(&self) -> &AxisChannel {
        &self.channels[CARRIAGE_AXIS]
    }

    /// Linear carriage, mutable.
    #[inline]
    pub fn carriage_mut(&mut self) -> &mut AxisChannel {
        &mut self.channels[CARRIAGE_AXIS]
    }

    /// Conveyor band.
    #[inline]
    pub fn band(&self) -> &AxisChannel {
        &self.channels[BAND_AXIS]
    }

    /// Conveyor band, mutable.
    #[inline]
    pub fn band_mut(&mut self) -> &mut AxisChannel {
        &mut self.channels[BAND_AXIS]
    }

    /// Axis driving `pump`.
    #[inline]
    pub fn pump(&self, pump: PumpId) -> &AxisChannel {
        &self.channels[pump.axis_index()]
    }

    /// Axis driving `pump`, mutable.
    #[inline]
    pub fn pump_mut(&mut self, pump: PumpId) -> &mut AxisChannel {
        &mut self.channels[pump.axis_index()]
    }

    /// All channels in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &AxisChannel> {
        self.channels.iter()
    }

    /// Number of channels.
    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Always false after a successful `initialize`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
