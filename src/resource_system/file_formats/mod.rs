pub mod animationfile;
pub mod handedness;
pub mod meshfile;
pub mod staticmeshfile;
