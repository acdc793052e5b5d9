mod band;
mod detection;
mod harness;
mod homing;
mod motion;
mod protocol;
mod pump;
