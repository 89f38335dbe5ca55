//! Gender inference for speaker labels from pronouns and a first-name dictionary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

const MALE_PRONOUNS: &[&str] = &["he", "him", "his"];
const FEMALE_PRONOUNS: &[&str] = &["she", "her", "hers"];

const BUILTIN_MALE: &[&str] = &[
    "aaron", "adam", "alan", "albert", "alexander", "andrew", "anthony", "arthur", "ben",
    "benjamin", "bill", "bob", "brian", "bruce", "carl", "charles", "charlie", "chris",
    "christopher", "daniel", "david", "dennis", "donald", "douglas", "edward", "eric", "frank",
    "fred", "gandalf", "gary", "george", "gerald", "harold", "harry", "henry", "jack", "james",
    "jason", "jeffrey", "jerry", "jim", "joe", "john", "jonathan", "joseph", "joshua", "kenneth",
    "kevin", "larry", "lawrence", "luke", "mark", "matthew", "michael", "nathan", "nicholas",
    "patrick", "paul", "peter", "philip", "ralph", "raymond", "richard", "robert", "roger",
    "ron", "ronald", "roy", "samuel", "scott", "sean", "stephen", "steven", "thomas", "tim",
    "timothy", "tom", "tony", "victor", "walter", "wayne", "william",
];

const BUILTIN_FEMALE: &[&str] = &[
    "abigail", "alice", "amanda", "amy", "angela", "ann", "anna", "anne", "barbara", "betty",
    "beth", "carol", "caroline", "catherine", "charlotte", "christine", "claire", "cynthia",
    "deborah", "diana", "donna", "dorothy", "elizabeth", "ella", "emily", "emma", "evelyn",
    "frances", "grace", "hannah", "heather", "helen", "hermione", "jane", "janet", "jennifer",
    "jessica", "joan", "judith", "julia", "julie", "karen", "kate", "katherine", "laura", "linda",
    "lisa", "lucy", "margaret", "maria", "marie", "martha", "mary", "megan", "melissa",
    "michelle", "nancy", "nicole", "olivia", "pamela", "rachel", "rebecca", "rose", "ruth",
    "sandra", "sarah", "sharon", "sophia", "stephanie", "susan", "teresa", "victoria",
    "virginia",
];

/// Case-insensitive first-name lookup table.
#[derive(Debug, Clone)]
pub struct NameDictionary {
    names: HashMap<String, Gender>,
}

impl Default for NameDictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NameDictionary {
    /// Dictionary seeded with common English first names.
    pub fn builtin() -> Self {
        let names = BUILTIN_MALE
            .iter()
            .map(|n| (n.to_string(), Gender::Male))
            .chain(BUILTIN_FEMALE.iter().map(|n| (n.to_string(), Gender::Female)))
            .collect();
        Self { names }
    }

    /// Add names, overriding built-in entries with the same spelling.
    pub fn with_names(mut self, male: &[String], female: &[String]) -> Self {
        for name in male {
            self.names.insert(name.trim().to_lowercase(), Gender::Male);
        }
        for name in female {
            self.names.insert(name.trim().to_lowercase(), Gender::Female);
        }
        self
    }

    pub fn lookup(&self, first_name: &str) -> Option<Gender> {
        self.names.get(&first_name.to_lowercase()).copied()
    }

    /// Guess a speaker's gender from a pronoun or the first word of a name.
    pub fn guess_gender(&self, speaker: &str) -> Option<Gender> {
        let lower = speaker.trim().to_lowercase();

        if MALE_PRONOUNS.contains(&lower.as_str()) {
            return Some(Gender::Male);
        }
        if FEMALE_PRONOUNS.contains(&lower.as_str()) {
            return Some(Gender::Female);
        }

        let first = lower.split_whitespace().next()?;
        self.lookup(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pronouns() {
        let names = NameDictionary::builtin();
        assert_eq!(names.guess_gender("he"), Some(Gender::Male));
        assert_eq!(names.guess_gender("His"), Some(Gender::Male));
        assert_eq!(names.guess_gender("SHE"), Some(Gender::Female));
        assert_eq!(names.guess_gender("hers"), Some(Gender::Female));
    }

    #[test]
    fn test_builtin_names() {
        let names = NameDictionary::builtin();
        assert_eq!(names.guess_gender("Tom"), Some(Gender::Male));
        assert_eq!(names.guess_gender("Mary"), Some(Gender::Female));
        assert_eq!(names.guess_gender("Mary Ann Evans"), Some(Gender::Female));
    }

    #[test]
    fn test_unknown_name() {
        let names = NameDictionary::builtin();
        assert_eq!(names.guess_gender("Zorblax"), None);
        assert_eq!(names.guess_gender("they"), None);
        assert_eq!(names.guess_gender(""), None);
    }

    #[test]
    fn test_extra_names_override_builtin() {
        let names = NameDictionary::builtin()
            .with_names(&["Zorblax".to_string()], &[" Tom ".to_string()]);
        assert_eq!(names.guess_gender("zorblax"), Some(Gender::Male));
        assert_eq!(names.guess_gender("Tom"), Some(Gender::Female));
    }

    #[test]
    fn test_builtin_lists_are_disjoint() {
        for name in BUILTIN_MALE {
            assert!(!BUILTIN_FEMALE.contains(name), "{name} listed twice");
        }
    }

    #[test]
    fn test_gender_serde() {
        let json = serde_json::to_string(&Gender::Female).unwrap();
        assert_eq!(json, "\"female\"");
    }
}
