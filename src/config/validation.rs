use crate::catalog::FieldName;
use crate::config::types::{Config, ScrapingConfig, SupplierConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraping_config(&config.scraping)?;
    validate_output_config(&config.output)?;

    if config.suppliers.is_empty() {
        return Err(ConfigError::Validation(
            "at least one supplier must be configured".to_string(),
        ));
    }

    for supplier in &config.suppliers {
        validate_supplier(supplier)?;
    }

    Ok(())
}

/// Validates scraping parameters
fn validate_scraping_config(config: &ScrapingConfig) -> Result<(), ConfigError> {
    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "delay_min_ms ({}) must not exceed delay_max_ms ({})",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 20 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 20, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.max_pages_per_category < 1 {
        return Err(ConfigError::Validation(
            "max_pages_per_category must be >= 1".to_string(),
        ));
    }

    if config.max_products_per_category < 1 {
        return Err(ConfigError::Validation(
            "max_products_per_category must be >= 1".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.snapshot_path.is_empty() {
        return Err(ConfigError::Validation(
            "snapshot_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates one supplier entry
fn validate_supplier(supplier: &SupplierConfig) -> Result<(), ConfigError> {
    if supplier.id.is_empty() {
        return Err(ConfigError::Validation(
            "supplier id cannot be empty".to_string(),
        ));
    }

    if !supplier
        .id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "supplier id must contain only alphanumeric characters and hyphens, got '{}'",
            supplier.id
        )));
    }

    if supplier.name.is_empty() {
        return Err(ConfigError::Validation(format!(
            "supplier '{}' must have a display name",
            supplier.id
        )));
    }

    let base = Url::parse(&supplier.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("supplier '{}' base-url: {}", supplier.id, e))
    })?;
    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "supplier '{}' base-url must be http(s), got '{}'",
            supplier.id, supplier.base_url
        )));
    }

    if supplier.categories.is_empty() {
        return Err(ConfigError::Validation(format!(
            "supplier '{}' must have at least one category",
            supplier.id
        )));
    }

    for entry in &supplier.categories {
        if !entry.path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "supplier '{}' category '{}' path must start with '/', got '{}'",
                supplier.id, entry.category, entry.path
            )));
        }
    }

    // Duplicate categories would walk the same listing twice
    for (i, entry) in supplier.categories.iter().enumerate() {
        if supplier.categories[..i]
            .iter()
            .any(|other| other.category == entry.category)
        {
            return Err(ConfigError::Validation(format!(
                "supplier '{}' lists category '{}' more than once",
                supplier.id, entry.category
            )));
        }
    }

    validate_selector_fields(supplier)?;

    Ok(())
}

/// Checks the field rule list for required fields and duplicates.
///
/// Selector syntax itself is checked when the catalog is compiled.
fn validate_selector_fields(supplier: &SupplierConfig) -> Result<(), ConfigError> {
    let fields = &supplier.selectors.fields;

    if supplier.selectors.container.is_empty() {
        return Err(ConfigError::Validation(format!(
            "supplier '{}' container selector cannot be empty",
            supplier.id
        )));
    }

    for required in [FieldName::Name, FieldName::Price] {
        if !fields.iter().any(|f| f.field == required) {
            return Err(ConfigError::Validation(format!(
                "supplier '{}' is missing a rule for required field '{}'",
                supplier.id, required
            )));
        }
    }

    for (i, spec) in fields.iter().enumerate() {
        if fields[..i].iter().any(|other| other.field == spec.field) {
            return Err(ConfigError::Validation(format!(
                "supplier '{}' defines field '{}' more than once",
                supplier.id, spec.field
            )));
        }
    }

    Ok(())
}
