use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnerId(pub String);

/// Contact/address record owned by the partner directory. This extension
/// only reads partners: quotations reference them as pickup locations,
/// final destinations, and billing/shipping customers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl Partner {
    /// Multi-line postal address, one component per line, empty components
    /// dropped.
    pub fn display_address(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for part in [&self.street, &self.street2] {
            if let Some(value) = part.as_deref() {
                if !value.trim().is_empty() {
                    lines.push(value);
                }
            }
        }

        let mut locality = String::new();
        for part in [&self.city, &self.state, &self.zip] {
            if let Some(value) = part.as_deref() {
                if value.trim().is_empty() {
                    continue;
                }
                if !locality.is_empty() {
                    locality.push(' ');
                }
                locality.push_str(value.trim());
            }
        }

        let mut rendered: Vec<String> = lines.iter().map(|line| line.trim().to_string()).collect();
        if !locality.is_empty() {
            rendered.push(locality);
        }
        if let Some(country) = self.country.as_deref() {
            if !country.trim().is_empty() {
                rendered.push(country.trim().to_string());
            }
        }

        rendered.join("\n")
    }

    /// Address collapsed to a single report-friendly line. Falls back to the
    /// partner name when no address components are set.
    pub fn address_one_line(&self) -> String {
        let address = self.display_address();
        let parts: Vec<&str> = address
            .lines()
            .map(|line| line.trim().trim_matches(','))
            .filter(|line| !line.is_empty())
            .collect();

        if parts.is_empty() {
            self.name.clone()
        } else {
            parts.join(", ")
        }
    }
}
