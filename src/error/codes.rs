/// Error code registry for mrjobs
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Input errors
/// - 3000-3999: Output errors
/// - 4000-4999: Task errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;

    // Input errors (2000-2999)
    pub const INPUT_NOT_FOUND: u16 = 2001;
    pub const INPUT_READ_FAILED: u16 = 2002;
    pub const INPUT_INVALID_DATA: u16 = 2003;

    // Output errors (3000-3999)
    pub const OUTPUT_ALREADY_EXISTS: u16 = 3001;
    pub const OUTPUT_WRITE_FAILED: u16 = 3002;
    pub const OUTPUT_NOT_A_DIRECTORY: u16 = 3003;

    // Task errors (4000-4999)
    pub const TASK_GENERIC: u16 = 4000;
    pub const TASK_FATAL_RECORD: u16 = 4001;
    pub const TASK_PANICKED: u16 = 4002;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Generic configuration error",
        1001 => "Configuration file not found",
        1002 => "Invalid TOML syntax in configuration",
        1003 => "Invalid value in configuration",

        2001 => "Input path not found",
        2002 => "Failed to read input",
        2003 => "Input is not valid UTF-8 text",

        3001 => "Output directory already exists and is not empty",
        3002 => "Failed to write output",
        3003 => "Output path is not a directory",

        4000 => "Generic task error",
        4001 => "Record could not be processed",
        4002 => "Task panicked",

        _ => "Unknown error code",
    }
}
