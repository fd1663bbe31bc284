//! The fixed catalogue of caller-audible text. Flows never build ad-hoc
//! sentences and never leak technical detail; everything spoken on a call
//! comes from here.

use crate::domain::CatalogItem;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// Terminal messages.
pub const GENERIC_FAILURE: &str =
    "We are unable to complete your request right now. Please try again later. Goodbye.";
pub const MAX_ATTEMPTS_REACHED: &str =
    "Too many unsuccessful attempts. Please try again later. Goodbye.";
pub const IDENTIFICATION_FAILED: &str =
    "We could not verify the student identification number. Please contact your school office. Goodbye.";
pub const NO_OPTIONS: &str = "There are no options available for you at the moment. Goodbye.";
pub const REGISTRATION_FAILED: &str =
    "Your celebration could not be recorded. Please try again later. Goodbye.";
pub const REGISTRATION_DONE: &str = "Your celebration was recorded. Thank you and goodbye.";
pub const NO_VOUCHERS_CHOSEN: &str = "No vouchers were chosen. Goodbye.";
pub const VOUCHERS_RECORDED: &str = "Your voucher choices were recorded. Thank you and goodbye.";
pub const COMPLETION_RECORDED: &str =
    "The celebration was marked as completed. Thank you and goodbye.";

pub fn duplicate_event(support_number: &str) -> String {
    format!(
        "A celebration of this type is already recorded for that date. \
         Records cannot be changed by phone; please contact support at {support_number}. Goodbye."
    )
}

pub fn path_recorded(name: &str) -> String {
    format!("The track {name} was recorded for your celebration. Thank you and goodbye.")
}

// Authentication.
pub fn welcome(account_name: &str) -> String {
    format!("Welcome to the {account_name} celebrations line.")
}

pub const TOKEN_PROMPT: &str = "Please enter the student identification number.";
pub const STUDENT_NOT_FOUND: &str =
    "We could not find a student with that identification number. Please try again.";

pub fn greeting(student_name: &str) -> String {
    format!("Hello {student_name}.")
}

// Menu.
pub const MENU_INTRO: &str = "Main menu.";

pub fn menu_option(label: &str, digit: u8) -> String {
    format!("To {label}, press {digit}.")
}

pub fn branch_chosen(label: &str) -> String {
    format!("You chose to {label}.")
}

// Selection engine.
pub fn option_line(item: &CatalogItem) -> String {
    match &item.description {
        Some(description) => format!("For {}, {}, press {}.", item.name, description, item.key),
        None => format!("For {}, press {}.", item.name, item.key),
    }
}

pub fn auto_selected(name: &str) -> String {
    format!("The only available option, {name}, was selected for you.")
}

pub fn picked(name: &str) -> String {
    format!("You selected {name}.")
}

pub fn finish_option(digit: u8) -> String {
    format!("When you are finished, press {digit}.")
}

pub const CONFIRM_EMPTY_SELECTION: &str =
    "You have not selected anything. Do you want to continue without a selection?";
pub const SELECTION_RESTART: &str = "Let us choose again.";
pub const SELECTION_FINAL_WARNING: &str =
    "This choice cannot be changed later. Are you sure?";

pub fn selection_recap(names: &[&str]) -> String {
    format!("You selected: {}.", names.join(", "))
}

// Confirmation key labels, rendered by the transport.
pub const YES_CONFIRM: &str = "confirm";
pub const NO_RETRY: &str = "choose again";
pub const YES_CONTINUE: &str = "continue";
pub const NO_GO_BACK: &str = "go back";

// Date sub-flow.
pub const DAY_PROMPT: &str = "Enter the day of the celebration, between 1 and 31.";
pub fn month_prompt() -> String {
    let mut prompt = String::from("Choose the month of the celebration.");
    for (index, name) in MONTH_NAMES.iter().enumerate() {
        prompt.push_str(&format!(" For {}, press {}.", name, index + 1));
    }
    prompt
}
pub const DATE_NOT_RECOGNIZED: &str = "That date was not recognized. Let us try again.";

pub fn confirm_date(day: u32, month_name: &str, year: i32) -> String {
    format!("You entered {month_name} {day}, {year}.")
}

// Flow intros.
pub const EVENT_TYPE_INTRO: &str = "Which celebration would you like to report?";
pub const GIFT_INTRO: &str = "Choose a gift voucher.";
pub const OFFER_VOUCHERS: &str = "Would you like to choose gift vouchers now?";
pub const PATH_INTRO: &str = "Choose a track for your celebration.";
pub const COMPLETED_PATH_INTRO: &str = "Choose the track that was completed.";
pub const PICK_EVENT_FOR_PATH: &str = "Choose the celebration to assign a track to.";
pub const PICK_EVENT_FOR_VOUCHERS: &str = "Choose the celebration to attach vouchers to.";
pub const PICK_EVENT_FOR_UPDATE: &str = "Choose the celebration to update.";

pub fn event_label(type_name: &str, day: u32, month_name: &str) -> String {
    format!("{type_name} on {month_name} {day}")
}
