/// Build context supplied by the CI runtime for the current job.
///
/// Field names mirror the environment variables Concourse exposes to resource
/// containers; the host is responsible for collecting them.
#[derive(Debug, Clone, Default)]
pub struct BuildMetadata {
    pub build_id: String,
    pub build_name: String,
    pub build_job_name: String,
    pub build_pipeline_name: String,
    pub build_pipeline_instance_vars: Option<String>,
    pub build_team_name: String,
    pub atc_external_url: String,
}

impl BuildMetadata {
    fn substitutions(&self) -> [(&'static str, &str); 7] {
        [
            ("BUILD_ID", self.build_id.as_str()),
            ("BUILD_NAME", self.build_name.as_str()),
            ("BUILD_JOB_NAME", self.build_job_name.as_str()),
            ("BUILD_PIPELINE_NAME", self.build_pipeline_name.as_str()),
            (
                "BUILD_PIPELINE_INSTANCE_VARS",
                self.build_pipeline_instance_vars.as_deref().unwrap_or(""),
            ),
            ("BUILD_TEAM_NAME", self.build_team_name.as_str()),
            ("ATC_EXTERNAL_URL", self.atc_external_url.as_str()),
        ]
    }

    /// Substitutes `{PLACEHOLDER}` occurrences in `template` with the
    /// corresponding build field. Unknown placeholders are left untouched.
    pub fn render(&self, template: &str) -> String {
        let mut rendered = template.to_string();
        for (key, value) in self.substitutions() {
            rendered = rendered.replace(&format!("{{{key}}}"), value);
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_metadata() -> BuildMetadata {
        BuildMetadata {
            build_id: "12345".to_string(),
            build_name: "42".to_string(),
            build_job_name: "test-job".to_string(),
            build_pipeline_name: "test-pipeline".to_string(),
            build_pipeline_instance_vars: Some(r#"{"var": "value"}"#.to_string()),
            build_team_name: "main".to_string(),
            atc_external_url: "http://concourse.example.com".to_string(),
        }
    }

    #[test]
    fn test_render_substitutes_all_fields() {
        let build = build_metadata();
        let rendered = build.render(
            "Pipeline {BUILD_PIPELINE_NAME} task {BUILD_JOB_NAME} build {BUILD_NAME} \
             by {BUILD_TEAM_NAME} at {ATC_EXTERNAL_URL}",
        );
        assert_eq!(
            rendered,
            "Pipeline test-pipeline task test-job build 42 by main at http://concourse.example.com"
        );
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let build = build_metadata();
        assert_eq!(build.render("{BUILD_NAME}-{BUILD_NAME}"), "42-42");
    }

    #[test]
    fn test_render_missing_instance_vars_is_empty() {
        let build = BuildMetadata {
            build_pipeline_instance_vars: None,
            ..build_metadata()
        };
        assert_eq!(build.render("vars:{BUILD_PIPELINE_INSTANCE_VARS}"), "vars:");
    }

    #[test]
    fn test_render_unknown_placeholder_untouched() {
        let build = build_metadata();
        assert_eq!(build.render("{NOT_A_FIELD}"), "{NOT_A_FIELD}");
    }

    #[test]
    fn test_render_plain_text_unchanged() {
        let build = build_metadata();
        assert_eq!(build.render("no placeholders here"), "no placeholders here");
    }
}
