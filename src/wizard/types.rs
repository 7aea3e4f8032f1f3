use serde::{Deserialize, Serialize};

/// One stage of the intake flow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    PersonalInfo,
    Signature,
    Photo,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::PersonalInfo, Step::Signature, Step::Photo];

    pub fn index(&self) -> usize {
        match self {
            Step::PersonalInfo => 0,
            Step::Signature => 1,
            Step::Photo => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::PersonalInfo => "Personal Information",
            Step::Signature => "Digital Signature",
            Step::Photo => "Photo Verification",
        }
    }

    pub fn next(&self) -> Option<Step> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn is_first(&self) -> bool {
        self.previous().is_none()
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    /// Label of the forward affordance on this step
    pub fn action_label(&self) -> &'static str {
        if self.is_last() {
            "Submit"
        } else {
            "Next"
        }
    }

    /// Share of the flow reached once this step is showing
    pub fn progress_percent(&self) -> f32 {
        (self.index() + 1) as f32 / Self::ALL.len() as f32 * 100.0
    }
}

/// Free-text fields collected on the PersonalInfo step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    #[serde(rename = "fullName")]
    FullName,
    #[serde(rename = "dob")]
    Dob,
    #[serde(rename = "nationality")]
    Nationality,
    #[serde(rename = "address")]
    Address,
    #[serde(rename = "govID")]
    GovId,
}

/// Input widget hint for the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Text,
    Date,
}

impl FieldKey {
    /// Fields in entry order
    pub const ALL: [FieldKey; 5] = [
        FieldKey::FullName,
        FieldKey::Dob,
        FieldKey::Nationality,
        FieldKey::Address,
        FieldKey::GovId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::FullName => "fullName",
            FieldKey::Dob => "dob",
            FieldKey::Nationality => "nationality",
            FieldKey::Address => "address",
            FieldKey::GovId => "govID",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::FullName => "Full Legal Name",
            FieldKey::Dob => "Date of Birth",
            FieldKey::Nationality => "Nationality",
            FieldKey::Address => "Residential Address",
            FieldKey::GovId => "Government-issued ID",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            FieldKey::FullName => "As per official government ID",
            FieldKey::Dob => "",
            FieldKey::Nationality => "For tax and compliance checks",
            FieldKey::Address => "Verified using a valid document",
            FieldKey::GovId => "Passport, National ID card, or Driving License",
        }
    }

    pub fn input_kind(&self) -> InputKind {
        match self {
            FieldKey::Dob => InputKind::Date,
            _ => InputKind::Text,
        }
    }

    /// Message shown when the field is left blank
    pub fn required_message(&self) -> &'static str {
        match self {
            FieldKey::FullName => "Name is required",
            FieldKey::Dob => "Date of birth is required",
            FieldKey::Nationality => "Nationality is required",
            FieldKey::Address => "Address is required",
            FieldKey::GovId => "ID is required",
        }
    }

    /// Field that receives focus when Enter is pressed in this one
    pub fn next(&self) -> Option<FieldKey> {
        let index = Self::ALL.iter().position(|key| key == self)?;
        Self::ALL.get(index + 1).copied()
    }

    pub fn from_str_key(key: &str) -> Option<FieldKey> {
        Self::ALL.into_iter().find(|field| field.as_str() == key)
    }
}
