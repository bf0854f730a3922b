use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::actor::ActorKind;
use crate::lpa::Lpa;

/// Another actor on the LPA already carries the candidate's name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameMatch {
    pub subject: ActorKind,
    pub matched: ActorKind,
    /// Empty for the donor and the certificate provider.
    pub matched_id: String,
}

impl NameMatch {
    /// Translatable reason, named after the actor that was matched.
    pub fn code(&self) -> String {
        let matched = self.matched.message_name();
        if self.matched == self.subject {
            format!("error{matched}Matches{matched}")
        } else {
            format!("error{matched}MatchesActor")
        }
    }

    pub fn key(&self) -> WarningKey {
        WarningKey {
            subject: self.subject,
            matched: self.matched,
            matched_id: self.matched_id.clone(),
        }
    }
}

/// Finds the first actor, other than the one being edited, whose first and
/// last names both equal the candidate's exactly.
///
/// Actors are checked donor first, then attorneys, replacement attorneys, the
/// certificate provider and finally people to notify. Actors with no name
/// recorded never match.
pub fn find_name_match(
    lpa: &Lpa,
    subject: ActorKind,
    editing_id: Option<&str>,
    first_names: &str,
    last_name: &str,
) -> Option<NameMatch> {
    if first_names.is_empty() && last_name.is_empty() {
        return None;
    }

    let same = |kind: ActorKind, id: &str, first: &str, last: &str| {
        let is_self = kind == subject
            && match editing_id {
                Some(editing) => editing == id,
                // donor and certificate provider are singletons
                None => matches!(kind, ActorKind::Donor | ActorKind::CertificateProvider),
            };
        !is_self && first == first_names && last == last_name
    };
    let found = |matched: ActorKind, matched_id: &str| NameMatch {
        subject,
        matched,
        matched_id: matched_id.to_string(),
    };

    if same(ActorKind::Donor, "", &lpa.donor.first_names, &lpa.donor.last_name) {
        return Some(found(ActorKind::Donor, ""));
    }
    for attorney in &lpa.attorneys {
        if same(ActorKind::Attorney, &attorney.id, &attorney.first_names, &attorney.last_name) {
            return Some(found(ActorKind::Attorney, &attorney.id));
        }
    }
    for attorney in &lpa.replacement_attorneys {
        if same(
            ActorKind::ReplacementAttorney,
            &attorney.id,
            &attorney.first_names,
            &attorney.last_name,
        ) {
            return Some(found(ActorKind::ReplacementAttorney, &attorney.id));
        }
    }
    let provider = &lpa.certificate_provider;
    if same(
        ActorKind::CertificateProvider,
        "",
        &provider.first_names,
        &provider.last_name,
    ) {
        return Some(found(ActorKind::CertificateProvider, ""));
    }
    for person in &lpa.people_to_notify {
        if same(ActorKind::PersonToNotify, &person.id, &person.first_names, &person.last_name) {
            return Some(found(ActorKind::PersonToNotify, &person.id));
        }
    }
    None
}

/// Identity of a name warning as echoed back by the form when the user
/// chooses to carry on. Rendered as `subject:matched:matched_id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarningKey {
    pub subject: ActorKind,
    pub matched: ActorKind,
    pub matched_id: String,
}

impl fmt::Display for WarningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.subject.as_str(),
            self.matched.as_str(),
            self.matched_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed warning key: {0}")]
pub struct ParseWarningKeyError(String);

impl FromStr for WarningKey {
    type Err = ParseWarningKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.splitn(3, ':');
        let subject = parts.next().and_then(ActorKind::parse);
        let matched = parts.next().and_then(ActorKind::parse);
        match (subject, matched, parts.next()) {
            (Some(subject), Some(matched), Some(matched_id)) => Ok(Self {
                subject,
                matched,
                matched_id: matched_id.to_string(),
            }),
            _ => Err(ParseWarningKeyError(value.to_string())),
        }
    }
}

/// A name match as shown to the user, with the key to echo back.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NameWarning {
    pub code: String,
    pub key: String,
    pub subject: ActorKind,
    pub first_names: String,
    pub last_name: String,
}

impl NameWarning {
    pub fn new(found: &NameMatch, first_names: &str, last_name: &str) -> Self {
        Self {
            code: found.code(),
            key: found.key().to_string(),
            subject: found.subject,
            first_names: first_names.to_string(),
            last_name: last_name.to_string(),
        }
    }
}

/// Whether the acknowledgement sent with a form covers this match. Anything
/// unparseable or naming a different actor does not.
pub fn acknowledged(found: &NameMatch, ignore: Option<&str>) -> bool {
    ignore
        .and_then(|value| value.parse::<WarningKey>().ok())
        .is_some_and(|key| key == found.key())
}
