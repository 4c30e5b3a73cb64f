//! different utility modules used throughout the project
/// terminal and file logger set up from the settings
pub mod logger;
/// PNG plots of curves and surfaces
pub mod plots;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into HashMap
/// and turn it into the calculator settings
pub mod settings_parser;
