use crate::error::{CallFileError, Result};
use serde::{Deserialize, Serialize};

/// What the switch does once the call is answered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "ActionDocument", into = "ActionDocument")]
pub enum Action {
    Application(Application),
    Context(Context),
}

/// Run a dialplan application with its argument string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    name: String,
    data: String,
}

/// Jump into the dialplan at `context,extension,priority`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    context: String,
    extension: String,
    priority: String,
}

fn required(field: &'static str, value: String) -> Result<String> {
    if value.is_empty() {
        Err(CallFileError::MissingField(field))
    } else {
        Ok(value)
    }
}

impl Application {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: required("application", name.into())?,
            data: required("data", data.into())?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn render(&self) -> Vec<String> {
        vec![
            format!("Application: {}", self.name),
            format!("Data: {}", self.data),
        ]
    }
}

impl Context {
    pub fn new(
        context: impl Into<String>,
        extension: impl Into<String>,
        priority: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            context: required("context", context.into())?,
            extension: required("extension", extension.into())?,
            priority: required("priority", priority.into())?,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn priority(&self) -> &str {
        &self.priority
    }

    pub fn render(&self) -> Vec<String> {
        vec![
            format!("Context: {}", self.context),
            format!("Extension: {}", self.extension),
            format!("Priority: {}", self.priority),
        ]
    }
}

impl Action {
    pub fn render(&self) -> Vec<String> {
        match self {
            Action::Application(app) => app.render(),
            Action::Context(ctx) => ctx.render(),
        }
    }

    pub(crate) fn values(&self) -> Vec<(&'static str, &str)> {
        match self {
            Action::Application(app) => vec![
                ("action.application", app.name.as_str()),
                ("action.data", app.data.as_str()),
            ],
            Action::Context(ctx) => vec![
                ("action.context", ctx.context.as_str()),
                ("action.extension", ctx.extension.as_str()),
                ("action.priority", ctx.priority.as_str()),
            ],
        }
    }
}

impl From<Application> for Action {
    fn from(app: Application) -> Self {
        Action::Application(app)
    }
}

impl From<Context> for Action {
    fn from(ctx: Context) -> Self {
        Action::Context(ctx)
    }
}

/// Loose, field-per-directive form of an [`Action`] as it appears in
/// documents. Exactly one of the two field families may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ActionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl TryFrom<ActionDocument> for Action {
    type Error = CallFileError;

    fn try_from(doc: ActionDocument) -> Result<Self> {
        let wants_app = doc.application.is_some() || doc.data.is_some();
        let wants_ctx = doc.context.is_some() || doc.extension.is_some() || doc.priority.is_some();
        match (wants_app, wants_ctx) {
            (true, true) => Err(CallFileError::MultipleActions),
            (false, false) => Err(CallFileError::NoAction),
            (true, false) => Ok(Application::new(
                doc.application.unwrap_or_default(),
                doc.data.unwrap_or_default(),
            )?
            .into()),
            (false, true) => Ok(Context::new(
                doc.context.unwrap_or_default(),
                doc.extension.unwrap_or_default(),
                doc.priority.unwrap_or_default(),
            )?
            .into()),
        }
    }
}

impl From<Action> for ActionDocument {
    fn from(action: Action) -> Self {
        match action {
            Action::Application(app) => ActionDocument {
                application: Some(app.name),
                data: Some(app.data),
                ..Default::default()
            },
            Action::Context(ctx) => ActionDocument {
                context: Some(ctx.context),
                extension: Some(ctx.extension),
                priority: Some(ctx.priority),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_render() {
        let app = Application::new("Playback", "hello-world").unwrap();
        assert_eq!(app.render(), vec!["Application: Playback", "Data: hello-world"]);
    }

    #[test]
    fn test_context_render() {
        let ctx = Context::new("ctx", "s", "1").unwrap();
        assert_eq!(
            ctx.render(),
            vec!["Context: ctx", "Extension: s", "Priority: 1"]
        );
        let action: Action = ctx.into();
        assert_eq!(action.render().len(), 3);
    }

    #[test]
    fn test_missing_fields_fail_at_construction() {
        assert!(matches!(
            Application::new("", "hello-world"),
            Err(CallFileError::MissingField("application"))
        ));
        assert!(matches!(
            Application::new("Playback", ""),
            Err(CallFileError::MissingField("data"))
        ));
        assert!(matches!(
            Context::new("ctx", "", "1"),
            Err(CallFileError::MissingField("extension"))
        ));
        assert!(matches!(
            Context::new("ctx", "s", ""),
            Err(CallFileError::MissingField("priority"))
        ));
    }

    #[test]
    fn test_document_conversion() {
        let action = Action::try_from(ActionDocument {
            application: Some("Dial".to_string()),
            data: Some("SIP/200".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(action.render(), vec!["Application: Dial", "Data: SIP/200"]);

        assert!(matches!(
            Action::try_from(ActionDocument::default()),
            Err(CallFileError::NoAction)
        ));

        assert!(matches!(
            Action::try_from(ActionDocument {
                application: Some("Playback".to_string()),
                data: Some("hello-world".to_string()),
                context: Some("default".to_string()),
                ..Default::default()
            }),
            Err(CallFileError::MultipleActions)
        ));

        assert!(matches!(
            Action::try_from(ActionDocument {
                context: Some("default".to_string()),
                extension: Some("s".to_string()),
                ..Default::default()
            }),
            Err(CallFileError::MissingField("priority"))
        ));
    }

    #[test]
    fn test_deserialize_action() {
        let action: Action = toml::from_str(
            r#"
            context = "wakeup"
            extension = "s"
            priority = "1"
            "#,
        )
        .unwrap();
        assert_eq!(action, Context::new("wakeup", "s", "1").unwrap().into());

        let mixed = toml::from_str::<Action>(
            r#"
            application = "Playback"
            data = "tt-monkeys"
            priority = "1"
            "#,
        );
        assert!(mixed.is_err());
    }
}
