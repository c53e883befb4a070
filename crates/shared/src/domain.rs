use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Declares a single-choice survey question. The `Unselected` variant is the
/// blank answer and travels on the wire as `""`.
macro_rules! survey_option {
    ($name:ident, $field:literal { $($variant:ident => ($wire:literal, $label:literal)),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            #[default]
            #[serde(rename = "")]
            Unselected,
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const FIELD: &'static str = $field;
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn wire_value(self) -> &'static str {
                match self {
                    Self::Unselected => "",
                    $(Self::$variant => $wire,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    Self::Unselected => "",
                    $(Self::$variant => $label,)+
                }
            }

            pub fn is_selected(self) -> bool {
                self != Self::Unselected
            }
        }

        impl FromStr for $name {
            type Err = FieldError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                if value.is_empty() {
                    return Ok(Self::Unselected);
                }
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.wire_value() == value)
                    .ok_or_else(|| FieldError::UnknownOption {
                        field: $field,
                        value: value.to_string(),
                    })
            }
        }
    };
}

survey_option!(AgeGroup, "ageGroup" {
    From18To25 => ("18-25", "18-25"),
    From26To35 => ("26-35", "26-35"),
    From36To50 => ("36-50", "36-50"),
    From51To65 => ("51-65", "51-65"),
    Over65 => ("65+", "65+"),
});

survey_option!(HearAbout, "hearAbout" {
    Friends => ("friends", "Friends/Family Recommendation"),
    SocialMedia => ("social-media", "Social Media (Instagram, Facebook, etc.)"),
    TravelBlog => ("travel-blog", "Travel Blogs/Websites"),
    Guidebook => ("guidebook", "Travel Guidebook"),
    Documentary => ("documentary", "Documentary/Film"),
    TourCompany => ("tour-company", "Tour Company"),
    Other => ("other", "Other"),
});

survey_option!(PlanningMethod, "planningMethod" {
    Diy => ("diy", "Completely DIY (researched myself)"),
    TravelAgency => ("travel-agency", "Through a travel agency"),
    TourPackage => ("tour-package", "Bought a tour package"),
    LocalHelp => ("local-help", "Got help from locals/friends"),
    Mix => ("mix", "Mix of the above"),
    Spontaneous => ("spontaneous", "Spontaneous (no planning)"),
});

survey_option!(TravelStyle, "travelStyle" {
    Budget => ("budget", "Budget Backpacker"),
    MidRange => ("mid-range", "Mid-range Traveler"),
    Luxury => ("luxury", "Luxury Traveler"),
    Spiritual => ("spiritual", "Spiritual Seeker"),
    Cultural => ("cultural", "Cultural Explorer"),
});

survey_option!(StayDuration, "duration" {
    OneToTwoDays => ("1-2", "1-2 days"),
    ThreeToFourDays => ("3-4", "3-4 days"),
    FiveToSevenDays => ("5-7", "5-7 days"),
    OverAWeek => ("week+", "More than a week"),
});

survey_option!(WouldPay, "wouldPayForService" {
    Definitely => ("definitely", "Definitely yes"),
    Probably => ("probably", "Probably yes"),
    Maybe => ("maybe", "Maybe"),
    ProbablyNot => ("probably-not", "Probably not"),
    No => ("no", "Definitely not"),
});

survey_option!(PriceRange, "priceWilling" {
    Under50 => ("under-50", "Under $50"),
    From50To100 => ("50-100", "$50-$100"),
    From100To200 => ("100-200", "$100-$200"),
    From200To500 => ("200-500", "$200-$500"),
    Over500 => ("500+", "$500+"),
});

/// Services a traveler can mark as important. The wire value is the label itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportantService {
    #[serde(rename = "Customized daily itinerary")]
    DailyItinerary,
    #[serde(rename = "Hotel/accommodation booking")]
    AccommodationBooking,
    #[serde(rename = "Local guide services")]
    LocalGuide,
    #[serde(rename = "Restaurant recommendations")]
    RestaurantRecommendations,
    #[serde(rename = "Transportation arrangements")]
    Transportation,
    #[serde(rename = "Spiritual experience guidance")]
    SpiritualGuidance,
    #[serde(rename = "Photography spots and tips")]
    PhotographySpots,
    #[serde(rename = "24/7 support during stay")]
    AroundTheClockSupport,
    #[serde(rename = "Pre-arrival cultural briefing")]
    CulturalBriefing,
    #[serde(rename = "Shopping and bargaining help")]
    ShoppingHelp,
}

impl ImportantService {
    pub const FIELD: &'static str = "importantServices";
    pub const ALL: &'static [ImportantService] = &[
        Self::DailyItinerary,
        Self::AccommodationBooking,
        Self::LocalGuide,
        Self::RestaurantRecommendations,
        Self::Transportation,
        Self::SpiritualGuidance,
        Self::PhotographySpots,
        Self::AroundTheClockSupport,
        Self::CulturalBriefing,
        Self::ShoppingHelp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::DailyItinerary => "Customized daily itinerary",
            Self::AccommodationBooking => "Hotel/accommodation booking",
            Self::LocalGuide => "Local guide services",
            Self::RestaurantRecommendations => "Restaurant recommendations",
            Self::Transportation => "Transportation arrangements",
            Self::SpiritualGuidance => "Spiritual experience guidance",
            Self::PhotographySpots => "Photography spots and tips",
            Self::AroundTheClockSupport => "24/7 support during stay",
            Self::CulturalBriefing => "Pre-arrival cultural briefing",
            Self::ShoppingHelp => "Shopping and bargaining help",
        }
    }
}

impl FromStr for ImportantService {
    type Err = FieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|service| service.label() == value)
            .ok_or_else(|| FieldError::UnknownOption {
                field: Self::FIELD,
                value: value.to_string(),
            })
    }
}

/// Multi-select answer. Keeps insertion order for display; equality ignores order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ImportantService>", into = "Vec<ImportantService>")]
pub struct ServiceSelection(Vec<ImportantService>);

impl ServiceSelection {
    /// Flips membership of `service`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, service: ImportantService) -> bool {
        if let Some(index) = self.0.iter().position(|selected| *selected == service) {
            self.0.remove(index);
            false
        } else {
            self.0.push(service);
            true
        }
    }

    pub fn contains(&self, service: ImportantService) -> bool {
        self.0.contains(&service)
    }

    pub fn iter(&self) -> impl Iterator<Item = ImportantService> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for ServiceSelection {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|service| other.contains(*service))
    }
}

impl Eq for ServiceSelection {}

impl From<Vec<ImportantService>> for ServiceSelection {
    fn from(services: Vec<ImportantService>) -> Self {
        let mut selection = Self::default();
        for service in services {
            if !selection.contains(service) {
                selection.0.push(service);
            }
        }
        selection
    }
}

impl From<ServiceSelection> for Vec<ImportantService> {
    fn from(selection: ServiceSelection) -> Self {
        selection.0
    }
}

/// Overall experience score. Zero means "not rated yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    /// Builds a chosen rating; only 1 through 5 are selectable.
    pub fn new(value: u8) -> Result<Self, FieldError> {
        if (1..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(FieldError::RatingOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_set(self) -> bool {
        self.0 > 0
    }

    /// Whether `level` is highlighted: every level at or below the rating is.
    pub fn is_lit(self, level: u8) -> bool {
        level >= 1 && level <= self.0
    }

    pub fn levels(self) -> [bool; Rating::MAX as usize] {
        std::array::from_fn(|index| self.is_lit(index as u8 + 1))
    }
}

impl TryFrom<u8> for Rating {
    type Error = FieldError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > Self::MAX {
            return Err(FieldError::RatingOutOfRange(value));
        }
        Ok(Self(value))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

pub const FIELD_NAMES: &[&str] = &[
    "name",
    "nationality",
    "ageGroup",
    "hearAbout",
    "planningMethod",
    "travelStyle",
    "duration",
    "overallRating",
    "mainChallenges",
    "surprises",
    "missingInfo",
    "bestExperience",
    "worstExperience",
    "wouldPayForService",
    "priceWilling",
    "importantServices",
    "recommendations",
    "email",
];

pub const REQUIRED_FIELDS: &[&str] = &[
    "name",
    "nationality",
    "ageGroup",
    "hearAbout",
    "planningMethod",
    "travelStyle",
    "duration",
    "overallRating",
    "mainChallenges",
    "missingInfo",
    "bestExperience",
    "wouldPayForService",
];

/// One respondent's answers, keyed on the wire by the camelCase field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerRecord {
    pub name: String,
    pub nationality: String,
    pub age_group: AgeGroup,
    pub hear_about: HearAbout,
    pub planning_method: PlanningMethod,
    pub travel_style: TravelStyle,
    pub duration: StayDuration,
    pub overall_rating: Rating,
    pub main_challenges: String,
    pub surprises: String,
    pub missing_info: String,
    pub best_experience: String,
    pub worst_experience: String,
    pub would_pay_for_service: WouldPay,
    pub price_willing: PriceRange,
    pub important_services: ServiceSelection,
    pub recommendations: String,
    pub email: String,
}

impl AnswerRecord {
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// Applies one form edit by wire field name. `importantServices` toggles the
    /// named service instead of replacing the selection.
    pub fn update_field(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        match name {
            "name" => self.name = value.to_string(),
            "nationality" => self.nationality = value.to_string(),
            "ageGroup" => self.age_group = value.parse()?,
            "hearAbout" => self.hear_about = value.parse()?,
            "planningMethod" => self.planning_method = value.parse()?,
            "travelStyle" => self.travel_style = value.parse()?,
            "duration" => self.duration = value.parse()?,
            "overallRating" => {
                let rating = value
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| FieldError::InvalidRating(value.to_string()))?;
                self.set_rating(rating)?;
            }
            "mainChallenges" => self.main_challenges = value.to_string(),
            "surprises" => self.surprises = value.to_string(),
            "missingInfo" => self.missing_info = value.to_string(),
            "bestExperience" => self.best_experience = value.to_string(),
            "worstExperience" => self.worst_experience = value.to_string(),
            "wouldPayForService" => self.would_pay_for_service = value.parse()?,
            "priceWilling" => self.price_willing = value.parse()?,
            "importantServices" => {
                self.important_services.toggle(value.parse()?);
            }
            "recommendations" => self.recommendations = value.to_string(),
            "email" => self.email = value.to_string(),
            other => return Err(FieldError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    pub fn set_rating(&mut self, value: u8) -> Result<(), FieldError> {
        self.overall_rating = Rating::new(value)?;
        Ok(())
    }

    /// Required fields that are still blank, in form order. Whitespace-only text
    /// counts as blank.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !self.has_answer(field))
            .collect()
    }

    fn has_answer(&self, field: &str) -> bool {
        let filled = |text: &str| !text.trim().is_empty();
        match field {
            "name" => filled(&self.name),
            "nationality" => filled(&self.nationality),
            "ageGroup" => self.age_group.is_selected(),
            "hearAbout" => self.hear_about.is_selected(),
            "planningMethod" => self.planning_method.is_selected(),
            "travelStyle" => self.travel_style.is_selected(),
            "duration" => self.duration.is_selected(),
            "overallRating" => self.overall_rating.is_set(),
            "mainChallenges" => filled(&self.main_challenges),
            "surprises" => filled(&self.surprises),
            "missingInfo" => filled(&self.missing_info),
            "bestExperience" => filled(&self.best_experience),
            "worstExperience" => filled(&self.worst_experience),
            "wouldPayForService" => self.would_pay_for_service.is_selected(),
            "priceWilling" => self.price_willing.is_selected(),
            "importantServices" => !self.important_services.is_empty(),
            "recommendations" => filled(&self.recommendations),
            "email" => filled(&self.email),
            _ => false,
        }
    }
}

/// `(wire value, label)` pairs for a choice field, or `None` for free-text fields.
pub fn field_options(field: &str) -> Option<Vec<(&'static str, &'static str)>> {
    fn pairs<T: Copy>(
        all: &[T],
        wire: impl Fn(T) -> &'static str,
        label: impl Fn(T) -> &'static str,
    ) -> Vec<(&'static str, &'static str)> {
        all.iter().map(|option| (wire(*option), label(*option))).collect()
    }

    let options = match field {
        AgeGroup::FIELD => pairs(AgeGroup::ALL, AgeGroup::wire_value, AgeGroup::label),
        HearAbout::FIELD => pairs(HearAbout::ALL, HearAbout::wire_value, HearAbout::label),
        PlanningMethod::FIELD => pairs(
            PlanningMethod::ALL,
            PlanningMethod::wire_value,
            PlanningMethod::label,
        ),
        TravelStyle::FIELD => pairs(TravelStyle::ALL, TravelStyle::wire_value, TravelStyle::label),
        StayDuration::FIELD => pairs(
            StayDuration::ALL,
            StayDuration::wire_value,
            StayDuration::label,
        ),
        WouldPay::FIELD => pairs(WouldPay::ALL, WouldPay::wire_value, WouldPay::label),
        PriceRange::FIELD => pairs(PriceRange::ALL, PriceRange::wire_value, PriceRange::label),
        ImportantService::FIELD => pairs(
            ImportantService::ALL,
            ImportantService::label,
            ImportantService::label,
        ),
        _ => return None,
    };
    Some(options)
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
