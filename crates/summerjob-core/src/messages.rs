//! User-facing validation messages.

pub const REQUIRED: &str = "This field is required";
pub const INVALID_TYPE: &str = "Invalid value";
pub const OUT_OF_RANGE_NUMBER: &str = "Number is too large";
pub const EXPECTED_OBJECT: &str = "Expected a JSON object";
pub const INVALID_JSON: &str = "Form data is not valid JSON";

pub const INVALID_REGEX_NAME: &str = "Use letters and spaces only";
pub const EMPTY_FIRST_NAME: &str = "Enter a first name";
pub const EMPTY_LAST_NAME: &str = "Enter a last name";
pub const EMPTY_EMAIL: &str = "Enter an e-mail";
pub const INVALID_EMAIL: &str = "Enter a valid e-mail";
pub const EMPTY_PHONE: &str = "Enter a phone number";
pub const INVALID_REGEX_PHONE: &str = "Enter a valid phone number";

pub const MAX_CAPACITY_IMAGE: &str = "The uploaded image is too large";
pub const UNSUPPORTED_TYPE_IMAGE: &str = "Unsupported file type - only images are allowed";
pub const MAX_COUNT_IMAGE: &str = "Maximum number of images is";

pub const EMPTY_PROPOSED_JOB_NAME: &str = "Enter the job name";
pub const EMPTY_AREA_ID: &str = "Select an area";
pub const EMPTY_ADDRESS: &str = "Enter an address";
pub const EMPTY_CONTACT_INFORMATION: &str = "Enter contact information";
pub const EMPTY_REQUIRED_DAYS: &str = "Enter the estimated number of days";
pub const EMPTY_MAX_WORKERS: &str = "Enter the max number of workers";
pub const EMPTY_MIN_WORKERS: &str = "Enter the min number of workers";
pub const INVALID_TYPE_MAX_WORKERS: &str = "Max workers must be a number";
pub const INVALID_TYPE_MIN_WORKERS: &str = "Min workers must be a number";
pub const INVALID_TYPE_STRONG_WORKERS: &str = "Strong workers must be a number";
pub const NON_POSITIVE_MAX_WORKERS: &str = "Max workers must be positive";
pub const NON_POSITIVE_MIN_WORKERS: &str = "Min workers must be positive";
pub const NEGATIVE_STRONG_WORKERS: &str = "Strong workers must not be negative";
pub const MAX_BELOW_MIN_WORKERS: &str = "Max workers must not be below min workers";
pub const STRONG_ABOVE_MAX_WORKERS: &str = "Strong workers must not exceed max workers";
pub const EMPTY_JOB_TYPE: &str = "Select a job type";

pub const EMPTY_TOOL: &str = "Select a tool";
pub const NON_POSITIVE_NUMBER: &str = "Enter a positive number";
pub const INVALID_TYPE_NUMBER: &str = "Enter a number";

pub const EMPTY_AREA_NAME: &str = "Enter the area name";
pub const EMPTY_EVENT_NAME: &str = "Enter the event name";
pub const EMPTY_DATE: &str = "Enter a date";
pub const END_BEFORE_START: &str = "The event cannot end before it starts";
