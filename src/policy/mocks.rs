// Mock permission provider for testing - records every question asked

use std::cell::RefCell;
use std::collections::HashSet;

use super::roles::Role;
use super::traits::PermissionProvider;

#[derive(Debug)]
pub struct MockPermissions {
    pub role: Role,
    pub grant_everything: bool,
    pub buttons: RefCell<HashSet<String>>,
    pub workflows: RefCell<HashSet<String>>,
    pub denied_languages: RefCell<HashSet<String>>,
    pub asked: RefCell<Vec<String>>,
}

impl MockPermissions {
    pub fn allow_all(role: Role) -> Self {
        Self::new(role, true)
    }

    pub fn deny_all(role: Role) -> Self {
        Self::new(role, false)
    }

    fn new(role: Role, grant_everything: bool) -> Self {
        Self {
            role,
            grant_everything,
            buttons: RefCell::new(HashSet::new()),
            workflows: RefCell::new(HashSet::new()),
            denied_languages: RefCell::new(HashSet::new()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn grant_button(&self, action: &str) {
        self.buttons.borrow_mut().insert(action.to_string());
    }

    pub fn grant_workflow(&self, stage_id: &str) {
        self.workflows.borrow_mut().insert(stage_id.to_string());
    }

    pub fn deny_language(&self, language: &str) {
        self.denied_languages.borrow_mut().insert(language.to_string());
    }

    pub fn get_asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl PermissionProvider for MockPermissions {
    fn role(&self) -> Role {
        self.role
    }

    fn has_button(&self, action: &str) -> bool {
        self.asked.borrow_mut().push(format!("button:{action}"));
        self.grant_everything || self.buttons.borrow().contains(action)
    }

    fn has_workflow(&self, stage_id: &str) -> bool {
        self.asked.borrow_mut().push(format!("workflow:{stage_id}"));
        self.grant_everything || self.workflows.borrow().contains(stage_id)
    }

    fn can_access_variant(&self, project_id: &str, language: &str) -> bool {
        self.asked
            .borrow_mut()
            .push(format!("variant:{project_id}/{language}"));
        !self.denied_languages.borrow().contains(language)
    }
}
