//! Typed field names for each plan section
//!
//! Each enum lists the scalar fields of one section under the same camelCase
//! names the stored payload uses, so the string-addressed edit surface can be
//! mapped onto them without reflection.

use super::{BasicInfo, CurrentSituation, Goals, Monitoring, PlanIdentity, Services, SupportSystem};

macro_rules! section_fields {
    (
        $(#[$meta:meta])*
        $name:ident for $section:ty {
            $($variant:ident => $field:ident : $key:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every field of the section, in form order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Payload key of the field
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            /// Resolve a payload key; `None` for keys the section does not have
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Current value of the field
            pub fn get(self, section: &$section) -> &str {
                match self {
                    $($name::$variant => section.$field.as_str()),+
                }
            }

            pub(crate) fn slot(self, section: &mut $section) -> &mut String {
                match self {
                    $($name::$variant => &mut section.$field),+
                }
            }
        }
    };
}

section_fields! {
    /// Header fields stored at the top level of the payload
    IdentityField for PlanIdentity {
        CreatedAt => created_at: "createdAt",
        Creator => creator: "creator",
        SupportCoordinatorName => support_coordinator_name: "supportCoordinatorName",
        Contact => contact: "contact",
    }
}

section_fields! {
    BasicInfoField for BasicInfo {
        Name => name: "name",
        BirthDate => birth_date: "birthDate",
        Gender => gender: "gender",
        Address => address: "address",
        Phone => phone: "phone",
        EmergencyContact => emergency_contact: "emergencyContact",
        DisabilityType => disability_type: "disabilityType",
        SupportLevel => support_level: "supportLevel",
        Education => education: "education",
        MedicalInfo => medical_info: "medicalInfo",
    }
}

section_fields! {
    SituationField for CurrentSituation {
        LivingSituation => living_situation: "livingSituation",
        PhysicalCondition => physical_condition: "physicalCondition",
        MentalCondition => mental_condition: "mentalCondition",
        SocialParticipation => social_participation: "socialParticipation",
        FamilySituation => family_situation: "familySituation",
    }
}

section_fields! {
    GoalField for Goals {
        ShortTerm => short_term: "shortTerm",
        LongTerm => long_term: "longTerm",
        AchievementIndicators => achievement_indicators: "achievementIndicators",
    }
}

section_fields! {
    /// Scalar service fields; the selection list and metric maps have
    /// dedicated operations
    ServiceField for Services {
        Provider => provider: "provider",
        StartDate => start_date: "startDate",
    }
}

section_fields! {
    SupportSystemField for SupportSystem {
        SupportCoordinator => support_coordinator: "supportCoordinator",
        ServiceProviders => service_providers: "serviceProviders",
        RelatedInstitutions => related_institutions: "relatedInstitutions",
        InformalSupport => informal_support: "informalSupport",
    }
}

section_fields! {
    MonitoringField for Monitoring {
        Frequency => frequency: "frequency",
        EvaluationMethod => evaluation_method: "evaluationMethod",
        ReviewDate => review_date: "reviewDate",
        EmergencyResponse => emergency_response: "emergencyResponse",
    }
}
