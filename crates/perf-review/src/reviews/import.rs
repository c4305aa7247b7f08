//! CSV import of template criteria (`name,description,weight,sort_order`).

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{CriterionDefinition, Template};
use super::validation::{self, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum TemplateImportError {
    #[error("failed to read template file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid template CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("imported template is invalid: {0}")]
    Invalid(#[from] ValidationError),
}

pub struct TemplateImporter;

impl TemplateImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        name: &str,
        kind: &str,
    ) -> Result<Template, TemplateImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, name, kind)
    }

    /// Rows without a sort order keep their position in the file.
    pub fn from_reader<R: Read>(
        reader: R,
        name: &str,
        kind: &str,
    ) -> Result<Template, TemplateImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut criteria = Vec::new();
        for (position, row) in csv_reader.deserialize::<CriterionRow>().enumerate() {
            let row = row?;
            criteria.push(CriterionDefinition {
                name: row.name,
                description: row.description,
                weight: row.weight,
                sort_order: row.sort_order.unwrap_or(position as u32),
            });
        }

        let template = Template {
            id: None,
            name: name.trim().to_string(),
            description: String::new(),
            kind: kind.trim().to_string(),
            active: true,
            criteria,
        };

        validation::validate_template(&template)?;
        Ok(template)
    }
}

#[derive(Debug, Deserialize)]
struct CriterionRow {
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    weight: f64,
    #[serde(default)]
    sort_order: Option<u32>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn imports_rows_in_file_order() {
        let csv = "name,description,weight,sort_order\n\
Delivery,Ships what was committed,50,\n\
Collaboration,,30,\n\
Growth,Learns new skills,20,\n";

        let template = TemplateImporter::from_reader(Cursor::new(csv), "Engineering", "annual")
            .expect("import succeeds");

        assert_eq!(template.criteria.len(), 3);
        assert_eq!(template.criteria[0].name, "Delivery");
        assert_eq!(template.criteria[1].description, None);
        assert_eq!(template.criteria[2].sort_order, 2);
        assert_eq!(template.total_weight(), 100.0);
        assert!(template.active);
    }

    #[test]
    fn explicit_sort_order_wins() {
        let csv = "name,description,weight,sort_order\n\
Delivery,,60,5\n\
Teamwork,,40,1\n";

        let template = TemplateImporter::from_reader(Cursor::new(csv), "Support", "quarterly")
            .expect("import succeeds");
        let ordered: Vec<&str> = template
            .ordered_criteria()
            .iter()
            .map(|definition| definition.name.as_str())
            .collect();
        assert_eq!(ordered, vec!["Teamwork", "Delivery"]);
    }

    #[test]
    fn rejects_weights_that_miss_one_hundred() {
        let csv = "name,description,weight,sort_order\n\
Delivery,,50,\n\
Collaboration,,30,\n\
Growth,,10,\n";

        match TemplateImporter::from_reader(Cursor::new(csv), "Engineering", "annual") {
            Err(TemplateImportError::Invalid(ValidationError::TemplateWeightTotal { total })) => {
                assert_eq!(total, 90.0)
            }
            other => panic!("expected weight total error, got {other:?}"),
        }
    }

    #[test]
    fn reports_malformed_weight() {
        let csv = "name,description,weight,sort_order\nDelivery,,lots,\n";
        let error = TemplateImporter::from_reader(Cursor::new(csv), "Engineering", "annual")
            .expect_err("weight must be numeric");
        assert!(matches!(error, TemplateImportError::Csv(_)));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = TemplateImporter::from_path("./does-not-exist.csv", "Engineering", "annual")
            .expect_err("expected io error");
        assert!(matches!(error, TemplateImportError::Io(_)));
    }
}
