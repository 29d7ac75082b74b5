use serde::{Deserialize, Serialize};

use crate::mailto;

/// A volunteering possibility shown in the suggestion area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub name: String,
    pub cause: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub contact: String,
    pub address: String,
}

/// Template-facing view of an opportunity with its contact link resolved.
#[derive(Debug, Serialize)]
pub struct OpportunityCard<'a> {
    #[serde(flatten)]
    pub opportunity: &'a Opportunity,
    pub contact_href: Option<String>,
}

impl Opportunity {
    fn new(name: &str, cause: &str, description: &str, kind: &str, contact: &str, address: &str) -> Self {
        Self {
            name: name.to_string(),
            cause: cause.to_string(),
            description: description.to_string(),
            kind: kind.to_string(),
            contact: contact.to_string(),
            address: address.to_string(),
        }
    }

    /// `mailto:` link for contacting the organization, when the contact is an e-mail address.
    pub fn contact_href(&self) -> Option<String> {
        if !self.contact.contains('@') {
            return None;
        }
        let subject = format!("Interest in opportunity: {}", self.name);
        Some(mailto::build(&self.contact, &subject, None))
    }

    pub fn card(&self) -> OpportunityCard<'_> {
        OpportunityCard {
            opportunity: self,
            contact_href: self.contact_href(),
        }
    }
}

/// The fixed list served in mock mode.
pub fn mock_opportunities() -> Vec<Opportunity> {
    vec![
        Opportunity::new(
            "ONG Criança Feliz",
            "Early childhood education",
            "We need volunteers to help with educational activities for children aged 4 to 6.",
            "On-site volunteering",
            "contato@criancafeliz.org",
            "Rua das Palmeiras, 123, São Paulo, SP",
        ),
        Opportunity::new(
            "Projeto Patinhas Carentes",
            "Animal protection",
            "We are looking for volunteers to walk dogs and help clean the shelter on weekends.",
            "On-site volunteering",
            "patinhas@email.com",
            "Av. dos Animais, 789, São Paulo, SP",
        ),
        Opportunity::new(
            "Campanha do Agasalho Digital",
            "Social assistance",
            "Donate warm clothes online or help spread the word about our campaign.",
            "Online volunteering / Donation",
            "agasalhodigital.org",
            "Online",
        ),
    ]
}
