//! Artifact export: a JMeter test plan embedding every captured request,
//! and a tabular parameter/value sheet.

use std::collections::BTreeMap;

use crate::types::CapturedRequest;

/// Escape text for embedding in JMX XML.
pub fn escape_xml(unsafe_text: &str) -> String {
    let mut escaped = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

struct UrlParts {
    domain: String,
    port: String,
    protocol: String,
    path: String,
}

fn split_url(url: &str) -> UrlParts {
    match url::Url::parse(url) {
        Ok(parsed) => UrlParts {
            domain: parsed.host_str().unwrap_or_default().to_string(),
            port: parsed.port().map(|p| p.to_string()).unwrap_or_default(),
            protocol: parsed.scheme().to_string(),
            path: parsed.path().to_string(),
        },
        // Relative URL: everything we have is the path.
        Err(_) => UrlParts {
            domain: String::new(),
            port: String::new(),
            protocol: String::new(),
            path: url.to_string(),
        },
    }
}

/// One HTTPSamplerProxy element for a captured request. The edited URL
/// and payload take precedence, matching what a replay would send.
pub fn http_sampler(record: &CapturedRequest) -> String {
    let parts = split_url(record.effective_url());
    let body = record
        .effective_payload()
        .map(|p| p.body_text())
        .unwrap_or_default();
    let sampler_name = format!("{} {}", record.method, record.action);

    let body_props = if body.trim().is_empty() {
        String::new()
    } else {
        format!(
            r#"  <stringProp name="HTTPSampler.postBodyRaw">true</stringProp>
  <elementProp name="HTTPsampler.Files" elementType="HTTPFileArgs">
    <collectionProp name="HTTPFileArgs.files"/>
  </elementProp>
  <stringProp name="HTTPSampler.postBody">{}</stringProp>
"#,
            escape_xml(&body)
        )
    };

    format!(
        r#"<HTTPSamplerProxy guiclass="HttpTestSampleGui" testclass="HTTPSamplerProxy" testname="{name}" enabled="true">
  <elementProp name="HTTPsampler.Arguments" elementType="Arguments">
    <collectionProp name="Arguments.arguments"/>
  </elementProp>
  <stringProp name="HTTPSampler.domain">{domain}</stringProp>
  <stringProp name="HTTPSampler.port">{port}</stringProp>
  <stringProp name="HTTPSampler.protocol">{protocol}</stringProp>
  <stringProp name="HTTPSampler.contentEncoding"></stringProp>
  <stringProp name="HTTPSampler.path">{path}</stringProp>
  <stringProp name="HTTPSampler.method">{method}</stringProp>
  <boolProp name="HTTPSampler.follow_redirects">true</boolProp>
  <boolProp name="HTTPSampler.auto_redirects">false</boolProp>
  <boolProp name="HTTPSampler.use_keepalive">true</boolProp>
  <boolProp name="HTTPSampler.DO_MULTIPART_POST">false</boolProp>
{body_props}</HTTPSamplerProxy>"#,
        name = escape_xml(&sampler_name),
        domain = escape_xml(&parts.domain),
        port = parts.port,
        protocol = parts.protocol,
        path = escape_xml(&parts.path),
        method = record.method,
        body_props = body_props,
    )
}

/// Wrap samplers into a complete plan: one thread group, a cookie
/// manager, all requests under a single Simple Controller, a per-request
/// response-code assertion, and summary/tree listeners at the root.
pub fn test_plan(records: &[CapturedRequest], assertion_code: u16) -> String {
    let samplers = records
        .iter()
        .map(|record| {
            format!(
                r#"{sampler}
<hashTree>
  <ResponseAssertion guiclass="AssertionGui" testclass="ResponseAssertion" testname="Response Assertion" enabled="true">
    <collectionProp name="Asserion.test_strings">
      <stringProp name="assert">{code}</stringProp>
    </collectionProp>
    <stringProp name="Assertion.test_field">Assertion.response_code</stringProp>
    <boolProp name="Assertion.assume_success">false</boolProp>
    <intProp name="Assertion.test_type">2</intProp>
  </ResponseAssertion>
  <hashTree/>
</hashTree>"#,
                sampler = http_sampler(record),
                code = assertion_code,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<jmeterTestPlan version="1.2" properties="5.0" jmeter="5.5">
<hashTree>
  <TestPlan guiclass="TestPlanGui" testclass="TestPlan" testname="Test Plan" enabled="true">
    <stringProp name="TestPlan.comments"></stringProp>
    <boolProp name="TestPlan.functional_mode">false</boolProp>
    <boolProp name="TestPlan.tearDown_on_shutdown">true</boolProp>
    <elementProp name="TestPlan.user_defined_variables" elementType="Arguments" guiclass="ArgumentsPanel" testclass="Arguments" enabled="true">
      <collectionProp name="Arguments.arguments"/>
    </elementProp>
    <stringProp name="TestPlan.serialize_threadgroups">false</stringProp>
  </TestPlan>
  <hashTree>
    <ThreadGroup guiclass="ThreadGroupGui" testclass="ThreadGroup" testname="Thread Group" enabled="true">
      <stringProp name="ThreadGroup.on_sample_error">continue</stringProp>
      <elementProp name="ThreadGroup.main_controller" elementType="LoopController" guiclass="LoopControlPanel" testclass="LoopController" testname="Loop Controller" enabled="true">
        <boolProp name="LoopController.continue_forever">false</boolProp>
        <stringProp name="LoopController.loops">1</stringProp>
      </elementProp>
      <stringProp name="ThreadGroup.num_threads">1</stringProp>
      <stringProp name="ThreadGroup.ramp_time">1</stringProp>
      <boolProp name="ThreadGroup.scheduler">false</boolProp>
    </ThreadGroup>
    <hashTree>
      <CookieManager guiclass="CookiePanel" testclass="CookieManager" testname="HTTP Cookie Manager" enabled="true">
        <collectionProp name="CookieManager.cookies"/>
        <boolProp name="CookieManager.clearEachIteration">true</boolProp>
      </CookieManager>
      <hashTree/>
      <GenericController guiclass="LogicControllerGui" testclass="GenericController" testname="HTTP Requests" enabled="true"/>
      <hashTree>
{samplers}
      </hashTree>
    </hashTree>
    <ResultCollector guiclass="SummaryReport" testclass="ResultCollector" testname="Summary Report" enabled="true">
      <boolProp name="ResultCollector.error_logging">false</boolProp>
      <stringProp name="filename"></stringProp>
    </ResultCollector>
    <hashTree/>
    <ResultCollector guiclass="ViewResultsFullVisualizer" testclass="ResultCollector" testname="View Results Tree" enabled="true">
      <boolProp name="ResultCollector.error_logging">false</boolProp>
      <stringProp name="filename"></stringProp>
    </ResultCollector>
    <hashTree/>
  </hashTree>
</hashTree>
</jmeterTestPlan>
"#,
        samplers = samplers,
    )
}

/// Tabular parameter sheet: one `name,value` row per parameter with the
/// last-seen value.
pub fn params_csv(values: &BTreeMap<String, String>) -> String {
    let mut out = String::from("parameter,value\n");
    for (name, value) in values {
        out.push_str(&format!("{},{}\n", csv_field(name), csv_field(value)));
    }
    out
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;
