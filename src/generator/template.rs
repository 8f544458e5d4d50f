use url::Url;

use crate::errors::ProbeKitError;
use crate::models::{Candidate, CandidateIdentity};
use crate::transport::{HttpMethod, ProbeRequest};

/// Value sent for each parameter during parameter discovery.
pub const PARAMETER_PROBE_VALUE: &str = "test";

/// Turns candidates into concrete requests against one target.
#[derive(Debug, Clone)]
pub enum RequestTemplate {
    Credential {
        target: Url,
        method: HttpMethod,
        user_field: String,
        pass_field: String,
        extra_fields: Vec<(String, String)>,
    },
    Path {
        base: Url,
    },
    Parameter {
        target: Url,
    },
    Payload {
        target: Url,
    },
}

impl RequestTemplate {
    pub fn target(&self) -> &Url {
        match self {
            Self::Credential { target, .. } => target,
            Self::Path { base } => base,
            Self::Parameter { target } | Self::Payload { target } => target,
        }
    }

    pub fn materialize(&self, candidate: &Candidate) -> Result<ProbeRequest, ProbeKitError> {
        match (self, &candidate.identity) {
            (
                Self::Credential { target, method, user_field, pass_field, extra_fields },
                CandidateIdentity::Credential { username, password },
            ) => {
                let mut fields = vec![
                    (user_field.clone(), username.clone()),
                    (pass_field.clone(), password.clone()),
                ];
                fields.extend(extra_fields.iter().cloned());
                Ok(match method {
                    HttpMethod::Post => ProbeRequest::post(target.clone(), fields),
                    HttpMethod::Get => {
                        let mut url = target.clone();
                        url.query_pairs_mut().extend_pairs(fields);
                        ProbeRequest::get(url)
                    }
                })
            }
            (Self::Path { base }, CandidateIdentity::Path { path }) => {
                let joined = format!(
                    "{}/{}",
                    base.as_str().trim_end_matches('/'),
                    path.trim_start_matches('/')
                );
                let url = Url::parse(&joined)
                    .map_err(|e| ProbeKitError::InvalidTarget(format!("{}: {}", joined, e)))?;
                Ok(ProbeRequest::get(url))
            }
            (Self::Parameter { target }, CandidateIdentity::Parameter { name }) => {
                Ok(ProbeRequest::get(inject_query_param(target, name, PARAMETER_PROBE_VALUE)))
            }
            (Self::Payload { target }, CandidateIdentity::Payload { parameter, payload }) => {
                Ok(ProbeRequest::get(inject_query_param(target, parameter, payload)))
            }
            (template, identity) => Err(ProbeKitError::Internal(format!(
                "Candidate {:?} does not fit the {} template",
                identity,
                template.kind()
            ))),
        }
    }

    /// The request used to capture a baseline: the target with empty input.
    pub fn neutral_request(&self) -> ProbeRequest {
        match self {
            Self::Credential { target, method: HttpMethod::Post, user_field, pass_field, .. } => {
                ProbeRequest::post(
                    target.clone(),
                    vec![(user_field.clone(), String::new()), (pass_field.clone(), String::new())],
                )
            }
            other => ProbeRequest::get(other.target().clone()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Credential { .. } => "credential",
            Self::Path { .. } => "path",
            Self::Parameter { .. } => "parameter",
            Self::Payload { .. } => "payload",
        }
    }
}

/// Set `param` to `value` in the URL query, replacing existing occurrences or appending.
pub fn inject_query_param(base: &Url, param: &str, value: &str) -> Url {
    let mut url = base.clone();
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut found = false;
    for (k, v) in pairs.iter_mut() {
        if k == param {
            *v = value.to_string();
            found = true;
        }
    }
    if !found {
        pairs.push((param.to_string(), value.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url
}

/// Distinct query parameter names of a URL, in first-seen order.
pub fn query_parameters(url: &Url) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (k, _) in url.query_pairs() {
        if !names.iter().any(|n| n == k.as_ref()) {
            names.push(k.to_string());
        }
    }
    names
}
