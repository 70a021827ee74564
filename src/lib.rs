pub mod robot_hal;
pub mod robot_hal_mock;
pub mod robot_config;
pub mod height_presets;

pub mod claw;
pub mod arm;
pub mod climber;
pub mod drive_helper;
pub mod drivetrain;
pub mod robot;

pub mod command;
pub mod scheduler;
pub mod claw_commands;
pub mod arm_commands;
pub mod climb_commands;
pub mod drive_commands;

pub mod input;
pub mod input_translator;
pub mod operator_interface;
pub mod dashboard;
pub mod telemetry;
pub mod scripted_input;
pub mod robot_loop;
