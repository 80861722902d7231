mod login_wizard;

pub use login_wizard::prompt_credentials;
