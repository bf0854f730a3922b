use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub town_or_city: String,
    pub postcode: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.line1.is_empty()
            && self.line2.is_empty()
            && self.line3.is_empty()
            && self.town_or_city.is_empty()
            && self.postcode.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            &self.line1,
            &self.line2,
            &self.line3,
            &self.town_or_city,
            &self.postcode,
        ];
        let joined = parts
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

/// The donor.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub first_names: String,
    pub last_name: String,
    pub other_names: String,
    pub email: String,
    pub date_of_birth: Option<Date>,
    pub address: Address,
}

impl Person {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attorney {
    pub id: String,
    pub first_names: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<Date>,
    pub address: Address,
}

impl Attorney {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }

    pub fn has_name(&self) -> bool {
        !self.first_names.is_empty() && !self.last_name.is_empty()
    }

    pub fn has_address(&self) -> bool {
        !self.address.line1.is_empty()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonToNotify {
    pub id: String,
    pub first_names: String,
    pub last_name: String,
    pub email: String,
    pub address: Address,
}

impl PersonToNotify {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }

    pub fn has_address(&self) -> bool {
        !self.address.line1.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Personally,
    Professionally,
}

impl Relationship {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "personally" => Some(Self::Personally),
            "professionally" => Some(Self::Professionally),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipLength {
    #[serde(rename = "lt-2-years")]
    LessThanTwoYears,
    #[serde(rename = "gte-2-years")]
    TwoYearsOrMore,
}

impl RelationshipLength {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "lt-2-years" => Some(Self::LessThanTwoYears),
            "gte-2-years" => Some(Self::TwoYearsOrMore),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateProvider {
    pub first_names: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub date_of_birth: Option<Date>,
    pub relationship: Option<Relationship>,
    pub relationship_description: String,
    pub relationship_length: Option<RelationshipLength>,
    pub address: Address,
}

impl CertificateProvider {
    pub fn full_name(&self) -> String {
        full_name(&self.first_names, &self.last_name)
    }
}

fn full_name(first_names: &str, last_name: &str) -> String {
    format!("{first_names} {last_name}").trim().to_string()
}

/// Every role an actor can hold on an LPA.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Donor,
    Attorney,
    ReplacementAttorney,
    CertificateProvider,
    PersonToNotify,
}

impl ActorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Attorney => "attorney",
            Self::ReplacementAttorney => "replacement_attorney",
            Self::CertificateProvider => "certificate_provider",
            Self::PersonToNotify => "person_to_notify",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "donor" => Some(Self::Donor),
            "attorney" => Some(Self::Attorney),
            "replacement_attorney" => Some(Self::ReplacementAttorney),
            "certificate_provider" => Some(Self::CertificateProvider),
            "person_to_notify" => Some(Self::PersonToNotify),
            _ => None,
        }
    }

    /// Fragment used to build translation keys such as `errorDonorMatchesActor`.
    pub fn message_name(&self) -> &'static str {
        match self {
            Self::Donor => "Donor",
            Self::Attorney => "Attorney",
            Self::ReplacementAttorney => "ReplacementAttorney",
            Self::CertificateProvider => "CertificateProvider",
            Self::PersonToNotify => "PersonToNotify",
        }
    }
}

/// The three actor collections held on an LPA.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Attorneys,
    ReplacementAttorneys,
    PeopleToNotify,
}

impl Collection {
    pub fn kind(&self) -> ActorKind {
        match self {
            Self::Attorneys => ActorKind::Attorney,
            Self::ReplacementAttorneys => ActorKind::ReplacementAttorney,
            Self::PeopleToNotify => ActorKind::PersonToNotify,
        }
    }
}

pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Attorney {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for PersonToNotify {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Ordered actors with ids unique inside the list.
///
/// `put` only replaces; callers append new actors with `push` after minting an
/// id. `delete` removes the first actor with a matching id and keeps the order
/// of the rest.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ActorList<T>(Vec<T>);

pub type Attorneys = ActorList<Attorney>;
pub type PeopleToNotify = ActorList<PersonToNotify>;

impl<T> Default for ActorList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> From<Vec<T>> for ActorList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T: Identified> ActorList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.0.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.0.iter_mut().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn put(&mut self, item: T) -> bool {
        match self.0.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, item: &T) -> bool {
        match self.0.iter().position(|existing| existing.id() == item.id()) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(Identified::id).collect()
    }
}

impl<'a, T> IntoIterator for &'a ActorList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attorney(id: &str, first_names: &str) -> Attorney {
        Attorney {
            id: id.to_string(),
            first_names: first_names.to_string(),
            last_name: "Smith".to_string(),
            ..Attorney::default()
        }
    }

    #[test]
    fn put_replaces_in_place_and_keeps_order() {
        let mut attorneys = Attorneys::from(vec![
            attorney("a", "John"),
            attorney("b", "Joan"),
            attorney("c", "Jim"),
        ]);

        let replaced = attorneys.put(attorney("b", "Joanna"));

        assert!(replaced);
        assert_eq!(attorneys.ids(), vec!["a", "b", "c"]);
        assert_eq!(
            attorneys.get("b").map(|a| a.first_names.as_str()),
            Some("Joanna")
        );
    }

    #[test]
    fn put_unknown_id_is_a_no_op() {
        let mut attorneys = Attorneys::from(vec![attorney("a", "John")]);

        assert!(!attorneys.put(attorney("z", "Zed")));
        assert_eq!(attorneys.len(), 1);
        assert!(!attorneys.contains("z"));
    }

    #[test]
    fn delete_shifts_later_items_left() {
        let mut attorneys = Attorneys::from(vec![
            attorney("a", "John"),
            attorney("b", "Joan"),
            attorney("c", "Jim"),
        ]);

        assert!(attorneys.delete(&attorney("a", "")));
        assert_eq!(attorneys.ids(), vec!["b", "c"]);
    }

    #[test]
    fn delete_absent_item_leaves_list_unchanged() {
        let mut attorneys = Attorneys::from(vec![attorney("a", "John")]);
        let before = attorneys.clone();

        assert!(!attorneys.delete(&attorney("missing", "John")));
        assert_eq!(attorneys, before);
    }

    #[test]
    fn address_display_skips_empty_lines() {
        let address = Address {
            line1: "2 RICHMOND PLACE".to_string(),
            postcode: "B14 7ED".to_string(),
            ..Address::default()
        };
        assert_eq!(address.to_string(), "2 RICHMOND PLACE, B14 7ED");
        assert!(Address::default().is_empty());
    }

    #[test]
    fn actor_kind_round_trips_through_str() {
        for kind in [
            ActorKind::Donor,
            ActorKind::Attorney,
            ActorKind::ReplacementAttorney,
            ActorKind::CertificateProvider,
            ActorKind::PersonToNotify,
        ] {
            assert_eq!(ActorKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ActorKind::parse("stranger"), None);
    }
}
