//! Payment links
//!
//! Builds Venmo "pay" links. Phones get the app's own scheme; everything else
//! gets the web URL, which expects recipients prefixed with `@`.

use rust_decimal::Decimal;
use rusty_money::iso;

use crate::{money::payment_amount, uri::encode_component};

/// Note attached to payments when none is given.
pub const DEFAULT_NOTE: &str = "dinner-debt";

const MOBILE_BASE: &str = "venmo://paycharge?txn=pay";
const DESKTOP_BASE: &str = "https://venmo.com/?txn=pay";

/// Where the payment link will be opened.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Platform {
    /// A phone or tablet with the Venmo app.
    Mobile,

    /// Anything else; the link opens the website.
    Desktop,
}

impl Platform {
    /// Guesses the platform from a browser user-agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let user_agent = user_agent.to_ascii_lowercase();

        if ["iphone", "ipad", "ipod", "android"]
            .iter()
            .any(|device| user_agent.contains(device))
        {
            Platform::Mobile
        } else {
            Platform::Desktop
        }
    }
}

/// A request for one diner to pay their share.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRequest {
    amount: Decimal,
    note: String,
    recipient: Option<String>,
}

impl PaymentRequest {
    /// Creates a request for `amount` dollars with the default note.
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            note: DEFAULT_NOTE.to_string(),
            recipient: None,
        }
    }

    /// Replaces the note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Sets the payee handle, without any leading `@`.
    #[must_use]
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        let recipient = recipient.into();
        let handle = recipient.trim().trim_start_matches('@');

        self.recipient = (!handle.is_empty()).then(|| handle.to_string());
        self
    }

    /// Returns the amount requested
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the payee handle, if any
    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    /// Builds the Venmo link for `platform`.
    pub fn venmo_url(&self, platform: Platform) -> String {
        let amount = payment_amount(self.amount, iso::USD);
        let note = encode_component(&self.note);

        let (base, prefix) = match platform {
            Platform::Mobile => (MOBILE_BASE, ""),
            Platform::Desktop => (DESKTOP_BASE, "@"),
        };

        let mut url = format!("{base}&amount={amount}&note={note}");

        if let Some(recipient) = &self.recipient {
            url.push_str("&recipients=");
            url.push_str(prefix);
            url.push_str(&encode_component(recipient));
        }

        url
    }
}
