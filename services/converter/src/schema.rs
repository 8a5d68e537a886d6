//! Canonical retailer schema and the source column aliases for each field.
//!
//! Aliases are explicit, not inferred: a column is picked up only when its
//! trimmed header matches one of the names below exactly. Order matters, the
//! first alias with a usable value wins.

/// Canonical output fields, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Name,
    Locality,
    Postcode,
    Address,
    Latitude,
    Longitude,
    Category,
    Subcategory,
    CategoryDetail,
    BusinessStatus,
    PoliceForce,
    TacticalArea,
    LocalAuthority,
    Rating,
    RatingCount,
    Phone,
    Website,
}

/// How a field's resolved value is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Float,
    Integer,
}

const ID_COLUMNS: &[&str] = &["poi_id", "ID"];
const NAME_COLUMNS: &[&str] = &["name", "Name"];
const LOCALITY_COLUMNS: &[&str] = &["locality", "Locality"];
const POSTCODE_COLUMNS: &[&str] = &["postcode", "Postcode"];
const ADDRESS_COLUMNS: &[&str] = &["address", "Address"];
const LATITUDE_COLUMNS: &[&str] = &["latitude"];
const LONGITUDE_COLUMNS: &[&str] = &["longitude"];
const CATEGORY_COLUMNS: &[&str] = &["category_level1", "Category"];
const SUBCATEGORY_COLUMNS: &[&str] = &["category_level2", "Subcategory"];
const CATEGORY_DETAIL_COLUMNS: &[&str] = &["category_level3", "Detail"];
const BUSINESS_STATUS_COLUMNS: &[&str] = &["business_status", "Status"];
const POLICE_FORCE_COLUMNS: &[&str] = &["Police_Force", "Force"];
const TACTICAL_AREA_COLUMNS: &[&str] = &["Tactical_Area"];
const LOCAL_AUTHORITY_COLUMNS: &[&str] = &["Local_Authority"];
const RATING_COLUMNS: &[&str] = &["rating"];
const RATING_COUNT_COLUMNS: &[&str] = &["rating_count"];
const PHONE_COLUMNS: &[&str] = &["phone"];
const WEBSITE_COLUMNS: &[&str] = &["website_domain"];

impl Field {
    pub const ALL: [Field; 18] = [
        Field::Id,
        Field::Name,
        Field::Locality,
        Field::Postcode,
        Field::Address,
        Field::Latitude,
        Field::Longitude,
        Field::Category,
        Field::Subcategory,
        Field::CategoryDetail,
        Field::BusinessStatus,
        Field::PoliceForce,
        Field::TacticalArea,
        Field::LocalAuthority,
        Field::Rating,
        Field::RatingCount,
        Field::Phone,
        Field::Website,
    ];

    /// Key used in the emitted artifact.
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Locality => "locality",
            Field::Postcode => "postcode",
            Field::Address => "address",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::Category => "category",
            Field::Subcategory => "subcategory",
            Field::CategoryDetail => "category_detail",
            Field::BusinessStatus => "business_status",
            Field::PoliceForce => "police_force",
            Field::TacticalArea => "tactical_area",
            Field::LocalAuthority => "local_authority",
            Field::Rating => "rating",
            Field::RatingCount => "rating_count",
            Field::Phone => "phone",
            Field::Website => "website",
        }
    }

    /// Source column names accepted for this field, highest precedence first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Id => ID_COLUMNS,
            Field::Name => NAME_COLUMNS,
            Field::Locality => LOCALITY_COLUMNS,
            Field::Postcode => POSTCODE_COLUMNS,
            Field::Address => ADDRESS_COLUMNS,
            Field::Latitude => LATITUDE_COLUMNS,
            Field::Longitude => LONGITUDE_COLUMNS,
            Field::Category => CATEGORY_COLUMNS,
            Field::Subcategory => SUBCATEGORY_COLUMNS,
            Field::CategoryDetail => CATEGORY_DETAIL_COLUMNS,
            Field::BusinessStatus => BUSINESS_STATUS_COLUMNS,
            Field::PoliceForce => POLICE_FORCE_COLUMNS,
            Field::TacticalArea => TACTICAL_AREA_COLUMNS,
            Field::LocalAuthority => LOCAL_AUTHORITY_COLUMNS,
            Field::Rating => RATING_COLUMNS,
            Field::RatingCount => RATING_COUNT_COLUMNS,
            Field::Phone => PHONE_COLUMNS,
            Field::Website => WEBSITE_COLUMNS,
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Latitude | Field::Longitude | Field::Rating => FieldKind::Float,
            Field::RatingCount => FieldKind::Integer,
            _ => FieldKind::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_field_has_aliases() {
        for field in Field::ALL {
            assert!(!field.aliases().is_empty(), "{:?} has no aliases", field);
        }
    }

    #[test]
    fn test_field_names_unique() {
        let names: HashSet<&str> = Field::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), Field::ALL.len());
    }

    #[test]
    fn test_numeric_kinds() {
        assert_eq!(Field::Latitude.kind(), FieldKind::Float);
        assert_eq!(Field::Rating.kind(), FieldKind::Float);
        assert_eq!(Field::RatingCount.kind(), FieldKind::Integer);
        assert_eq!(Field::Postcode.kind(), FieldKind::Text);
    }

    #[test]
    fn test_alias_precedence_order() {
        assert_eq!(Field::Category.aliases(), &["category_level1", "Category"]);
        assert_eq!(Field::PoliceForce.aliases(), &["Police_Force", "Force"]);
    }
}
