use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Error, ParseEnumError};

/// Placeholder address used for every synthesized record and profile.
pub const PLACEHOLDER_LOCATION: &str = "Av. Principal, 123 - Tangará da Serra, MT";
pub const PLACEHOLDER_COMPANY: &str = "Agroindústria Exemplo";
pub const PLACEHOLDER_ORGANIZATION: &str = "Secretaria Municipal de Agricultura";
pub const PLACEHOLDER_PHONE: &str = "(65) 99999-9999";

lazy_static! {
    static ref RE_QUANTITY: Regex =
        Regex::new(r"^\s*(\d+(?:[.,]\d+)?)\s*(kg|ton|m3)\s*$").unwrap();
}

/// Declares a fieldless enum persisted as a snake_case string.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// Kind of ash handled by a record.
    WasteType, "waste type" {
        BiomassAsh => "biomass_ash",
        RiceHuskAsh => "rice_husk_ash",
        SugarcaneAsh => "sugarcane_ash",
        WoodAsh => "wood_ash",
        MixedAsh => "mixed_ash",
        Other => "other",
    }
);

wire_enum!(QuantityUnit, "unit" {
    Kilogram => "kg",
    Ton => "ton",
    CubicMeter => "m3",
});

wire_enum!(CollectionStatus, "collection status" {
    Pending => "pending",
    Scheduled => "scheduled",
    Completed => "completed",
    Canceled => "canceled",
});

wire_enum!(WasteRequestStatus, "waste request status" {
    Pending => "pending",
    Approved => "approved",
    Delivered => "delivered",
    Canceled => "canceled",
});

wire_enum!(
    /// What a public requester intends to do with the ash.
    Purpose, "purpose" {
        SoilCorrection => "soil_correction",
        OrganicFertilization => "organic_fertilization",
        Composting => "composting",
        MunicipalNursery => "municipal_nursery",
        CommunityGardens => "community_gardens",
        LandRecovery => "land_recovery",
        Other => "other",
    }
);

wire_enum!(UserType, "user type" {
    Industry => "industry",
    Public => "public",
});

impl WasteType {
    /// Producers cannot offer a mixture.
    pub fn accepted_for_collection(&self) -> bool {
        *self != WasteType::MixedAsh
    }

    /// Requesters pick among known ash kinds only.
    pub fn accepted_for_request(&self) -> bool {
        *self != WasteType::Other
    }
}

/// An amount of ash, persisted as `"<value> <unit>"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: QuantityUnit,
}

impl Quantity {
    pub fn new(value: f64, unit: QuantityUnit) -> Self {
        Quantity { value, unit }
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

impl FromStr for Quantity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseEnumError {
            kind: "quantity",
            value: s.to_string(),
        };
        let caps = RE_QUANTITY.captures(s).ok_or_else(invalid)?;
        let value: f64 = caps[1].replace(',', ".").parse().map_err(|_| invalid())?;
        Ok(Quantity {
            value,
            unit: caps[2].parse()?,
        })
    }
}

/// Locally generated record identifier.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

/// A persisted request, addressed through its collection key.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    type Status: Copy + PartialEq + fmt::Display + Send + Sync;

    /// Key under which records of this kind are grouped in the store.
    const COLLECTION_KEY: &'static str;
    const PENDING: Self::Status;
    const CANCELED: Self::Status;

    fn id(&self) -> &RecordId;
    /// When the record was submitted; lists are ordered by it.
    fn request_date(&self) -> DateTime<Utc>;
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);
}

/// Ash offered for pick-up by an agro-industrial producer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    pub id: RecordId,
    pub request_number: String,
    pub waste_type: WasteType,
    pub estimated_quantity: String,
    pub status: CollectionStatus,
    pub request_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub company_name: String,
    pub location: String,
}

impl CollectionRequest {
    /// `None` when the stored quantity string is free text.
    pub fn quantity(&self) -> Option<Quantity> {
        self.estimated_quantity.parse().ok()
    }
}

impl Record for CollectionRequest {
    type Status = CollectionStatus;

    const COLLECTION_KEY: &'static str = "collections";
    const PENDING: CollectionStatus = CollectionStatus::Pending;
    const CANCELED: CollectionStatus = CollectionStatus::Canceled;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn request_date(&self) -> DateTime<Utc> {
        self.request_date
    }

    fn status(&self) -> CollectionStatus {
        self.status
    }

    fn set_status(&mut self, status: CollectionStatus) {
        self.status = status;
    }
}

/// Ash asked for by a public-sector requester.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WasteRequest {
    pub id: RecordId,
    pub request_number: String,
    pub waste_type: WasteType,
    pub requested_quantity: String,
    pub purpose: Purpose,
    pub needed_by: DateTime<Utc>,
    pub status: WasteRequestStatus,
    pub request_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub organization_name: String,
    pub location: String,
}

impl WasteRequest {
    pub fn quantity(&self) -> Option<Quantity> {
        self.requested_quantity.parse().ok()
    }
}

impl Record for WasteRequest {
    type Status = WasteRequestStatus;

    const COLLECTION_KEY: &'static str = "wasteRequests";
    const PENDING: WasteRequestStatus = WasteRequestStatus::Pending;
    const CANCELED: WasteRequestStatus = WasteRequestStatus::Canceled;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn request_date(&self) -> DateTime<Utc> {
        self.request_date
    }

    fn status(&self) -> WasteRequestStatus {
        self.status
    }

    fn set_status(&mut self, status: WasteRequestStatus) {
        self.status = status;
    }
}

/// Profile shown for the logged in user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl UserData {
    pub fn synthesize(email: &str, user_type: UserType) -> Self {
        let (name, company) = match user_type {
            UserType::Industry => ("Gestor Agroindústria", PLACEHOLDER_COMPANY),
            UserType::Public => ("Gestor Público", "Secretaria de Agricultura"),
        };

        UserData {
            name: name.to_string(),
            company: company.to_string(),
            email: email.to_string(),
            phone: PLACEHOLDER_PHONE.to_string(),
            address: PLACEHOLDER_LOCATION.to_string(),
        }
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|notes| !notes.trim().is_empty())
}

/// Form input for a new [`CollectionRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDraft {
    pub waste_type: Option<WasteType>,
    pub quantity: Option<Quantity>,
    pub notes: Option<String>,
}

impl CollectionDraft {
    pub fn validate(&self) -> Result<(WasteType, Quantity), Error> {
        let (Some(waste_type), Some(quantity)) = (self.waste_type, self.quantity) else {
            return Err(Error::Validation(
                "waste type and estimated quantity are required".to_string(),
            ));
        };
        if !waste_type.accepted_for_collection() {
            return Err(Error::Validation(format!(
                "{} cannot be offered for collection",
                waste_type
            )));
        }
        if !quantity.is_valid() {
            return Err(Error::Validation(format!(
                "quantity must be positive, got {}",
                quantity
            )));
        }
        Ok((waste_type, quantity))
    }

    pub(crate) fn into_record(
        self,
        id: RecordId,
        request_number: String,
        now: DateTime<Utc>,
    ) -> Result<CollectionRequest, Error> {
        let (waste_type, quantity) = self.validate()?;
        Ok(CollectionRequest {
            id,
            request_number,
            waste_type,
            estimated_quantity: quantity.to_string(),
            status: CollectionStatus::Pending,
            request_date: now,
            scheduled_date: None,
            completed_date: None,
            notes: normalize_notes(self.notes),
            company_name: PLACEHOLDER_COMPANY.to_string(),
            location: PLACEHOLDER_LOCATION.to_string(),
        })
    }
}

/// Form input for a new [`WasteRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct WasteRequestDraft {
    pub waste_type: Option<WasteType>,
    pub quantity: Option<Quantity>,
    pub purpose: Option<Purpose>,
    /// Defaults to one week after submission.
    pub needed_by: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl WasteRequestDraft {
    pub const DEFAULT_LEAD_TIME_DAYS: i64 = 7;

    pub fn validate(&self) -> Result<(WasteType, Quantity, Purpose), Error> {
        let (Some(waste_type), Some(quantity), Some(purpose)) =
            (self.waste_type, self.quantity, self.purpose)
        else {
            return Err(Error::Validation(
                "waste type, requested quantity and purpose are required".to_string(),
            ));
        };
        if !waste_type.accepted_for_request() {
            return Err(Error::Validation(format!(
                "{} cannot be requested",
                waste_type
            )));
        }
        if !quantity.is_valid() {
            return Err(Error::Validation(format!(
                "quantity must be positive, got {}",
                quantity
            )));
        }
        Ok((waste_type, quantity, purpose))
    }

    pub(crate) fn into_record(
        self,
        id: RecordId,
        request_number: String,
        now: DateTime<Utc>,
    ) -> Result<WasteRequest, Error> {
        let (waste_type, quantity, purpose) = self.validate()?;
        Ok(WasteRequest {
            id,
            request_number,
            waste_type,
            requested_quantity: quantity.to_string(),
            purpose,
            needed_by: self
                .needed_by
                .unwrap_or(now + Duration::days(Self::DEFAULT_LEAD_TIME_DAYS)),
            status: WasteRequestStatus::Pending,
            request_date: now,
            approved_date: None,
            delivery_date: None,
            notes: normalize_notes(self.notes),
            organization_name: PLACEHOLDER_ORGANIZATION.to_string(),
            location: PLACEHOLDER_LOCATION.to_string(),
        })
    }
}
