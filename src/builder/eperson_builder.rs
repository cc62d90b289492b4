use crate::builder::harness::{priority, FixtureHarness, ObjectCleanup};
use crate::core::Context;
use crate::domain::model::EPerson;
use crate::utils::error::Result;

pub struct EPersonBuilder<'a> {
    harness: &'a FixtureHarness,
    context: &'a Context,
    eperson: Option<EPerson>,
}

impl<'a> EPersonBuilder<'a> {
    pub async fn create_eperson(harness: &'a FixtureHarness, context: &'a Context) -> Self {
        let result = harness.services().eperson_service().create(context).await;
        Self {
            harness,
            context,
            eperson: None,
        }
        .created(result)
    }

    fn created(mut self, result: Result<EPerson>) -> Self {
        if let Some(eperson) = self.harness.errors().capture(result) {
            self.harness.cleanups().register(ObjectCleanup::new(
                self.harness.services().clone(),
                &eperson.clone().into(),
                priority::EPERSON,
            ));
            self.eperson = Some(eperson);
        }
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        if let Some(eperson) = self.eperson.as_mut() {
            eperson.email = Some(email.to_string());
        }
        self
    }

    pub fn with_name_in_metadata(mut self, first_name: &str, last_name: &str) -> Self {
        if let Some(eperson) = self.eperson.as_mut() {
            eperson.first_name = Some(first_name.to_string());
            eperson.last_name = Some(last_name.to_string());
        }
        self
    }

    pub fn with_can_login(mut self, can_log_in: bool) -> Self {
        if let Some(eperson) = self.eperson.as_mut() {
            eperson.can_log_in = can_log_in;
        }
        self
    }

    pub async fn build(self) -> Option<EPerson> {
        let eperson = self.eperson?;
        let result = self
            .harness
            .services()
            .eperson_service()
            .update(self.context, &eperson)
            .await;
        self.harness.errors().capture(result).map(|_| eperson)
    }
}
