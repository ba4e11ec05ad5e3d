/// Terminal front end: keyboard, gamepad, sound and the pixel display.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
