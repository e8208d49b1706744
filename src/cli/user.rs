use std::io::Write;

use zeroize::Zeroize;

use crate::api::ApiClient;
use crate::error::{DeckError, Result};
use crate::models::{PasswordChange, ProfileUpdate};
use crate::settings::{clear_token, load_settings};

pub fn profile(
    first_name: Option<String>,
    last_name: Option<String>,
    currency: Option<String>,
    timezone: Option<String>,
) -> Result<()> {
    let update = ProfileUpdate {
        first_name,
        last_name,
        default_currency: currency.map(|c| c.to_uppercase()),
        timezone,
    };
    if update.is_empty() {
        return Err(DeckError::Validation(
            "Nothing to update. Pass at least one of --first-name, --last-name, --currency, --timezone.".into(),
        ));
    }

    let api = ApiClient::new(&load_settings())?;
    api.update_profile(&update)?;
    println!("Profile updated.");
    Ok(())
}

pub fn password() -> Result<()> {
    let current = rpassword::prompt_password("Current password: ")?;
    let mut new_password = rpassword::prompt_password("New password: ")?;
    let mut confirm = rpassword::prompt_password("Confirm new password: ")?;

    // Mismatches never leave the client
    if new_password != confirm {
        new_password.zeroize();
        confirm.zeroize();
        return Err(DeckError::Validation("New passwords do not match.".into()));
    }
    confirm.zeroize();

    if new_password.len() < 8 {
        new_password.zeroize();
        return Err(DeckError::Validation(
            "New password must be at least 8 characters.".into(),
        ));
    }

    let api = ApiClient::new(&load_settings())?;
    let change = PasswordChange {
        current_password: current,
        new_password,
    };
    let result = api.change_password(&change);
    drop(change);
    result?;

    println!("Password changed.");
    Ok(())
}

/// Delete the account and everything synced under it. Irreversible, so
/// the confirmation word must be typed in full; afterwards the stored
/// token is forgotten and a short sign-off is shown before exit.
pub fn delete() -> Result<()> {
    println!("This permanently deletes your account, every linked institution,");
    println!("and all synced accounts, transactions and holdings on the server.");
    println!("There is no undo.");
    println!();

    print!("Type DELETE to confirm: ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    if input.trim() != "DELETE" {
        println!("Cancelled.");
        return Ok(());
    }

    let api = ApiClient::new(&load_settings())?;
    api.delete_account()?;
    clear_token()?;

    println!();
    println!("Your account has been deleted. Goodbye.");
    std::thread::sleep(std::time::Duration::from_secs(3));
    Ok(())
}
