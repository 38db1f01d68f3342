//! different utility modules used throughout the project
/// tiny module to save solution and iterates into file
pub mod logger;
/// tiny module to plot the Newton iterates
pub mod plots;
