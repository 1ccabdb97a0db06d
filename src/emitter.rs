//! Code emission: render structured locator and accessor artifacts into
//! page-object source lines. The data lives in the artifacts; all
//! formatting lives here.

use crate::types::{AccessorArtifact, LocatorArtifact, StepRecord};

/// `public static By Username => By.XPath("//input[@id='username']");`
pub fn locator_code(artifact: &LocatorArtifact) -> String {
    format!(
        "public static By {} => By.XPath(\"{}\");",
        artifact.ident,
        artifact.selector.to_xpath()
    )
}

/// `public IWebElement GetUsername() => driver.FindElement(ElementClass.Username);`
pub fn accessor_code(artifact: &AccessorArtifact) -> String {
    format!(
        "public IWebElement Get{ident}() => driver.FindElement({class}.{ident});",
        ident = artifact.ident,
        class = artifact.element_class
    )
}

/// The (gherkin, locator, method) triple for one step, rendered.
pub fn render_step(step: &StepRecord) -> (String, String, String) {
    (
        step.gherkin_text.clone(),
        locator_code(&step.locator),
        accessor_code(&step.method),
    )
}

#[cfg(test)]
#[path = "emitter_test.rs"]
mod emitter_test;
