//! Business category derivation for recipient overviews.
//!
//! SAM registrations list business type codes (and an entity structure
//! code). Those codes map onto the FPDS business type flags, and the flags
//! roll up into the category names that transactions also carry, so both
//! sources can be merged into one sorted list.

use std::collections::BTreeSet;

/// FPDS business type flag set by one SAM business type code.
///
/// Variant names spell out the FPDS flag columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[expect(
    missing_docs,
    reason = "each variant is named after the FPDS column it stands for"
)]
pub enum BusinessTypeFlag {
    UsFederalGovernment,
    UsStateGovernment,
    UsLocalGovernment,
    CityLocalGovernment,
    CountyLocalGovernment,
    SchoolDistrictLocalGovernment,
    TransitAuthority,
    InterstateEntity,
    UsGovernmentEntity,
    IndianTribeFederallyRecognized,
    TribalGovernment,
    ForeignGovernment,
    InternationalOrganization,
    ForeignOwnedAndLocated,
    SmallAgriculturalCooperative,
    LimitedLiabilityCorporation,
    SubchapterSCorporation,
    ManufacturerOfGoods,
    ForProfitOrganization,
    SoleProprietorship,
    PartnershipOrLimitedLiabilityPartnership,
    CorporateEntityNotTaxExempt,
    CorporateEntityTaxExempt,
    NonprofitOrganization,
    OtherNotForProfitOrganization,
    CommunityDevelopmentCorporation,
    CommunityDevelopedCorporationOwnedFirm,
    LaborSurplusAreaFirm,
    VeteranOwnedBusiness,
    ServiceDisabledVeteranOwnedBusiness,
    WomanOwnedBusiness,
    WomenOwnedSmallBusiness,
    EconomicallyDisadvantagedWomenOwnedSmallBusiness,
    JointVentureWomenOwnedSmallBusiness,
    JointVentureEconomicallyDisadvantagedWomenOwnedSmallBusiness,
    MinorityOwnedBusiness,
    AsianPacificAmericanOwnedBusiness,
    SubcontinentAsianAmericanOwnedBusiness,
    BlackAmericanOwnedBusiness,
    HispanicAmericanOwnedBusiness,
    NativeAmericanOwnedBusiness,
    AlaskanNativeOwnedCorporation,
    NativeHawaiianOwnedBusiness,
    TriballyOwnedBusiness,
    AbilityOneProgram,
    SelfCertifiedSmallDisadvantagedBusiness,
    C8aProgramParticipant,
    Sba8aJointVenture,
    HistoricallyUnderutilizedBusinessZone,
    PrivateUniversityOrCollege,
    StateControlledInstitutionOfHigherLearning,
    EducationalInstitution,
    LandGrantCollege,
    HistoricallyBlackCollege,
    MinorityInstitution,
    HispanicServicingInstitution,
    TribalCollege,
    DomesticShelter,
    Hospital,
    VeterinaryHospital,
}

use BusinessTypeFlag as F;

const SAM_CODE_FLAGS: &[(&str, BusinessTypeFlag)] = &[
    ("2R", F::UsFederalGovernment),
    ("2F", F::UsStateGovernment),
    ("12", F::UsLocalGovernment),
    ("C8", F::CityLocalGovernment),
    ("C7", F::CountyLocalGovernment),
    ("H6", F::SchoolDistrictLocalGovernment),
    ("TW", F::TransitAuthority),
    ("2G", F::InterstateEntity),
    ("2A", F::UsGovernmentEntity),
    ("XY", F::IndianTribeFederallyRecognized),
    ("3I", F::TribalGovernment),
    ("CY", F::ForeignGovernment),
    ("X6", F::InternationalOrganization),
    ("20", F::ForeignOwnedAndLocated),
    ("1D", F::SmallAgriculturalCooperative),
    ("LJ", F::LimitedLiabilityCorporation),
    ("XS", F::SubchapterSCorporation),
    ("MF", F::ManufacturerOfGoods),
    ("2X", F::ForProfitOrganization),
    ("2J", F::SoleProprietorship),
    ("2K", F::PartnershipOrLimitedLiabilityPartnership),
    ("2L", F::CorporateEntityNotTaxExempt),
    ("8H", F::CorporateEntityTaxExempt),
    ("A8", F::NonprofitOrganization),
    ("2U", F::OtherNotForProfitOrganization),
    ("H2", F::CommunityDevelopmentCorporation),
    ("HK", F::CommunityDevelopedCorporationOwnedFirm),
    ("A3", F::LaborSurplusAreaFirm),
    ("A5", F::VeteranOwnedBusiness),
    ("QF", F::ServiceDisabledVeteranOwnedBusiness),
    ("A2", F::WomanOwnedBusiness),
    ("8W", F::WomenOwnedSmallBusiness),
    ("8E", F::EconomicallyDisadvantagedWomenOwnedSmallBusiness),
    ("8C", F::JointVentureWomenOwnedSmallBusiness),
    ("8D", F::JointVentureEconomicallyDisadvantagedWomenOwnedSmallBusiness),
    ("23", F::MinorityOwnedBusiness),
    ("FR", F::AsianPacificAmericanOwnedBusiness),
    ("QZ", F::SubcontinentAsianAmericanOwnedBusiness),
    ("OY", F::BlackAmericanOwnedBusiness),
    ("PI", F::HispanicAmericanOwnedBusiness),
    ("NB", F::NativeAmericanOwnedBusiness),
    ("05", F::AlaskanNativeOwnedCorporation),
    ("8U", F::NativeHawaiianOwnedBusiness),
    ("1B", F::TriballyOwnedBusiness),
    ("A7", F::AbilityOneProgram),
    ("27", F::SelfCertifiedSmallDisadvantagedBusiness),
    ("A6", F::C8aProgramParticipant),
    ("JT", F::Sba8aJointVenture),
    ("XX", F::HistoricallyUnderutilizedBusinessZone),
    ("1R", F::PrivateUniversityOrCollege),
    ("ZW", F::StateControlledInstitutionOfHigherLearning),
    ("M8", F::EducationalInstitution),
    ("G6", F::LandGrantCollege),
    ("G7", F::LandGrantCollege),
    ("G8", F::LandGrantCollege),
    ("HB", F::HistoricallyBlackCollege),
    ("1A", F::MinorityInstitution),
    ("1H", F::HispanicServicingInstitution),
    ("YG", F::TribalCollege),
    ("6D", F::DomesticShelter),
    ("80", F::Hospital),
    ("FY", F::VeterinaryHospital),
];

/// Look up the FPDS flag for one SAM business type code.
#[must_use]
pub fn flag_for_sam_code(code: &str) -> Option<BusinessTypeFlag> {
    SAM_CODE_FLAGS
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, flag)| *flag)
}

/// Map SAM business type codes plus the entity structure to flags.
///
/// Unknown codes are ignored.
#[must_use]
pub fn flags_from_sam<'a>(
    business_types_codes: impl IntoIterator<Item = &'a str>,
    entity_structure: Option<&'a str>,
) -> BTreeSet<BusinessTypeFlag> {
    business_types_codes
        .into_iter()
        .chain(entity_structure)
        .filter_map(flag_for_sam_code)
        .collect()
}

struct CategoryRule {
    category: &'static str,
    flags: &'static [BusinessTypeFlag],
}

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "category_business",
        flags: &[
            F::SmallAgriculturalCooperative,
            F::LimitedLiabilityCorporation,
            F::SubchapterSCorporation,
            F::ManufacturerOfGoods,
            F::ForProfitOrganization,
            F::SoleProprietorship,
            F::PartnershipOrLimitedLiabilityPartnership,
            F::CorporateEntityNotTaxExempt,
            F::CorporateEntityTaxExempt,
        ],
    },
    CategoryRule {
        category: "corporate_entity_tax_exempt",
        flags: &[F::CorporateEntityTaxExempt],
    },
    CategoryRule {
        category: "corporate_entity_not_tax_exempt",
        flags: &[F::CorporateEntityNotTaxExempt],
    },
    CategoryRule {
        category: "partnership_or_limited_liability_partnership",
        flags: &[F::PartnershipOrLimitedLiabilityPartnership],
    },
    CategoryRule {
        category: "sole_proprietorship",
        flags: &[F::SoleProprietorship],
    },
    CategoryRule {
        category: "manufacturer_of_goods",
        flags: &[F::ManufacturerOfGoods],
    },
    CategoryRule {
        category: "subchapter_s_corporation",
        flags: &[F::SubchapterSCorporation],
    },
    CategoryRule {
        category: "limited_liability_corporation",
        flags: &[F::LimitedLiabilityCorporation],
    },
    CategoryRule {
        category: "minority_owned_business",
        flags: &[
            F::MinorityOwnedBusiness,
            F::AsianPacificAmericanOwnedBusiness,
            F::SubcontinentAsianAmericanOwnedBusiness,
            F::BlackAmericanOwnedBusiness,
            F::HispanicAmericanOwnedBusiness,
            F::NativeAmericanOwnedBusiness,
            F::AlaskanNativeOwnedCorporation,
            F::NativeHawaiianOwnedBusiness,
            F::TriballyOwnedBusiness,
        ],
    },
    CategoryRule {
        category: "alaskan_native_corporation_owned_firm",
        flags: &[F::AlaskanNativeOwnedCorporation],
    },
    CategoryRule {
        category: "american_indian_owned_business",
        flags: &[F::NativeAmericanOwnedBusiness],
    },
    CategoryRule {
        category: "asian_pacific_american_owned_business",
        flags: &[F::AsianPacificAmericanOwnedBusiness],
    },
    CategoryRule {
        category: "black_american_owned_business",
        flags: &[F::BlackAmericanOwnedBusiness],
    },
    CategoryRule {
        category: "hispanic_american_owned_business",
        flags: &[F::HispanicAmericanOwnedBusiness],
    },
    CategoryRule {
        category: "native_hawaiian_organization_owned_firm",
        flags: &[F::NativeHawaiianOwnedBusiness],
    },
    CategoryRule {
        category: "subcontinent_asian_indian_american_owned_business",
        flags: &[F::SubcontinentAsianAmericanOwnedBusiness],
    },
    CategoryRule {
        category: "tribally_owned_firm",
        flags: &[F::TriballyOwnedBusiness],
    },
    CategoryRule {
        category: "woman_owned_business",
        flags: &[
            F::WomanOwnedBusiness,
            F::WomenOwnedSmallBusiness,
            F::EconomicallyDisadvantagedWomenOwnedSmallBusiness,
            F::JointVentureWomenOwnedSmallBusiness,
            F::JointVentureEconomicallyDisadvantagedWomenOwnedSmallBusiness,
        ],
    },
    CategoryRule {
        category: "women_owned_small_business",
        flags: &[F::WomenOwnedSmallBusiness],
    },
    CategoryRule {
        category: "economically_disadvantaged_women_owned_small_business",
        flags: &[F::EconomicallyDisadvantagedWomenOwnedSmallBusiness],
    },
    CategoryRule {
        category: "joint_venture_women_owned_small_business",
        flags: &[F::JointVentureWomenOwnedSmallBusiness],
    },
    CategoryRule {
        category: "joint_venture_economically_disadvantaged_women_owned_small_business",
        flags: &[F::JointVentureEconomicallyDisadvantagedWomenOwnedSmallBusiness],
    },
    CategoryRule {
        category: "veteran_owned_business",
        flags: &[F::VeteranOwnedBusiness, F::ServiceDisabledVeteranOwnedBusiness],
    },
    CategoryRule {
        category: "service_disabled_veteran_owned_business",
        flags: &[F::ServiceDisabledVeteranOwnedBusiness],
    },
    CategoryRule {
        category: "special_designations",
        flags: &[
            F::AbilityOneProgram,
            F::C8aProgramParticipant,
            F::Sba8aJointVenture,
            F::HistoricallyUnderutilizedBusinessZone,
            F::LaborSurplusAreaFirm,
            F::SelfCertifiedSmallDisadvantagedBusiness,
            F::SmallAgriculturalCooperative,
            F::CommunityDevelopedCorporationOwnedFirm,
            F::ForeignOwnedAndLocated,
            F::ForeignGovernment,
            F::InternationalOrganization,
            F::DomesticShelter,
            F::Hospital,
            F::VeterinaryHospital,
        ],
    },
    CategoryRule {
        category: "8a_program_participant",
        flags: &[F::C8aProgramParticipant],
    },
    CategoryRule {
        category: "ability_one_program",
        flags: &[F::AbilityOneProgram],
    },
    CategoryRule {
        category: "historically_underutilized_business_firm",
        flags: &[F::HistoricallyUnderutilizedBusinessZone],
    },
    CategoryRule {
        category: "labor_surplus_area_firm",
        flags: &[F::LaborSurplusAreaFirm],
    },
    CategoryRule {
        category: "sba_certified_8a_joint_venture",
        flags: &[F::Sba8aJointVenture],
    },
    CategoryRule {
        category: "self_certified_small_disadvanted_business",
        flags: &[F::SelfCertifiedSmallDisadvantagedBusiness],
    },
    CategoryRule {
        category: "small_agricultural_cooperative",
        flags: &[F::SmallAgriculturalCooperative],
    },
    CategoryRule {
        category: "community_developed_corporation_owned_firm",
        flags: &[F::CommunityDevelopedCorporationOwnedFirm],
    },
    CategoryRule {
        category: "foreign_owned",
        flags: &[F::ForeignOwnedAndLocated],
    },
    CategoryRule {
        category: "foreign_government",
        flags: &[F::ForeignGovernment],
    },
    CategoryRule {
        category: "international_organization",
        flags: &[F::InternationalOrganization],
    },
    CategoryRule {
        category: "domestic_shelter",
        flags: &[F::DomesticShelter],
    },
    CategoryRule {
        category: "hospital",
        flags: &[F::Hospital],
    },
    CategoryRule {
        category: "veterinary_hospital",
        flags: &[F::VeterinaryHospital],
    },
    CategoryRule {
        category: "nonprofit",
        flags: &[
            F::NonprofitOrganization,
            F::OtherNotForProfitOrganization,
            F::CommunityDevelopmentCorporation,
        ],
    },
    CategoryRule {
        category: "community_development_corporations",
        flags: &[F::CommunityDevelopmentCorporation],
    },
    CategoryRule {
        category: "higher_education",
        flags: &[
            F::PrivateUniversityOrCollege,
            F::StateControlledInstitutionOfHigherLearning,
            F::EducationalInstitution,
            F::LandGrantCollege,
            F::HistoricallyBlackCollege,
            F::MinorityInstitution,
            F::HispanicServicingInstitution,
            F::TribalCollege,
        ],
    },
    CategoryRule {
        category: "public_institution_of_higher_education",
        flags: &[F::StateControlledInstitutionOfHigherLearning],
    },
    CategoryRule {
        category: "private_institution_of_higher_education",
        flags: &[F::PrivateUniversityOrCollege],
    },
    CategoryRule {
        category: "minority_serving_institution_of_higher_education",
        flags: &[
            F::HistoricallyBlackCollege,
            F::MinorityInstitution,
            F::HispanicServicingInstitution,
            F::TribalCollege,
        ],
    },
    CategoryRule {
        category: "government",
        flags: &[
            F::UsFederalGovernment,
            F::UsStateGovernment,
            F::UsLocalGovernment,
            F::CityLocalGovernment,
            F::CountyLocalGovernment,
            F::SchoolDistrictLocalGovernment,
            F::TransitAuthority,
            F::InterstateEntity,
            F::UsGovernmentEntity,
            F::IndianTribeFederallyRecognized,
            F::TribalGovernment,
        ],
    },
    CategoryRule {
        category: "national_government",
        flags: &[F::UsFederalGovernment, F::UsGovernmentEntity],
    },
    CategoryRule {
        category: "regional_and_state_government",
        flags: &[F::UsStateGovernment],
    },
    CategoryRule {
        category: "interstate_entity",
        flags: &[F::InterstateEntity],
    },
    CategoryRule {
        category: "local_government",
        flags: &[
            F::UsLocalGovernment,
            F::CityLocalGovernment,
            F::CountyLocalGovernment,
            F::SchoolDistrictLocalGovernment,
        ],
    },
    CategoryRule {
        category: "authorities_and_commissions",
        flags: &[F::TransitAuthority],
    },
    CategoryRule {
        category: "indian_native_american_tribal_government",
        flags: &[F::IndianTribeFederallyRecognized, F::TribalGovernment],
    },
];

/// Roll FPDS flags up into business category names.
#[must_use]
pub fn categories_for_flags(flags: &BTreeSet<BusinessTypeFlag>) -> BTreeSet<String> {
    CATEGORY_RULES
        .iter()
        .filter(|rule| rule.flags.iter().any(|flag| flags.contains(flag)))
        .map(|rule| rule.category.to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn categories(codes: &[&str], entity_structure: Option<&str>) -> Vec<String> {
        let flags = flags_from_sam(codes.iter().copied(), entity_structure);
        categories_for_flags(&flags).into_iter().collect()
    }

    #[rstest]
    fn unknown_codes_yield_nothing() {
        assert!(categories(&["??", ""], None).is_empty());
    }

    #[rstest]
    fn entity_structure_contributes_flags() {
        let result = categories(&[], Some("2L"));
        assert_eq!(
            result,
            vec!["category_business", "corporate_entity_not_tax_exempt"]
        );
    }

    #[rstest]
    #[case(&["OY"], "minority_owned_business")]
    #[case(&["8W"], "woman_owned_business")]
    #[case(&["QF"], "veteran_owned_business")]
    #[case(&["A6"], "special_designations")]
    #[case(&["HB"], "higher_education")]
    #[case(&["C8"], "government")]
    #[case(&["A8"], "nonprofit")]
    fn parent_categories_follow_specific_flags(#[case] codes: &[&str], #[case] parent: &str) {
        assert!(categories(codes, None).iter().any(|c| c == parent));
    }

    #[rstest]
    fn every_sam_code_rolls_up_into_a_category() {
        for (code, flag) in SAM_CODE_FLAGS {
            let flags = BTreeSet::from([*flag]);
            assert!(
                !categories_for_flags(&flags).is_empty(),
                "{code} ({flag:?}) maps to no category"
            );
        }
    }

    #[rstest]
    fn results_are_sorted_and_unique() {
        let result = categories(&["2X", "LJ", "2X"], Some("2K"));
        let mut sorted = result.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(result, sorted);
    }
}
