use mongodb::bson::oid::ObjectId;

use crate::{
    auth::Auth,
    entities::{department::Department, issue::Issue, user::User},
};

pub trait AccessRules<Object, Subject> {
    fn get_access(&self, object: Object, subject: Subject) -> bool;
}

pub struct Read;

pub struct Edit;

impl<'a, 'b> AccessRules<&'a Auth, &'b User> for Read {
    fn get_access(&self, auth: &'a Auth, _user: &'b User) -> bool {
        #[allow(clippy::match_single_binding)]
        match auth {
            _ => true,
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b User> for Edit {
    fn get_access(&self, auth: &'a Auth, user: &'b User) -> bool {
        match auth {
            Auth::Service(_) | Auth::Admin(_) => true,
            Auth::Staff(id) | Auth::User(id) => id == &user.id,
            Auth::None => false,
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Department> for Read {
    fn get_access(&self, auth: &'a Auth, _department: &'b Department) -> bool {
        #[allow(clippy::match_single_binding)]
        match auth {
            _ => true,
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Department> for Edit {
    fn get_access(&self, auth: &'a Auth, _department: &'b Department) -> bool {
        matches!(auth, Auth::Service(_) | Auth::Admin(_))
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Issue> for Read {
    fn get_access(&self, auth: &'a Auth, _issue: &'b Issue) -> bool {
        #[allow(clippy::match_single_binding)]
        match auth {
            _ => true,
        }
    }
}

// Any authenticated caller may update an issue; the update trail records who.
impl<'a, 'b> AccessRules<&'a Auth, &'b Issue> for Edit {
    fn get_access(&self, auth: &'a Auth, _issue: &'b Issue) -> bool {
        match auth {
            Auth::Service(_) | Auth::Admin(_) | Auth::Staff(_) | Auth::User(_) => true,
            Auth::None => false,
        }
    }
}

/// Gate for the reporting surface: admins and department staff only.
pub struct ViewReports;

impl<'a> AccessRules<&'a Auth, ()> for ViewReports {
    fn get_access(&self, auth: &'a Auth, _object: ()) -> bool {
        match auth {
            Auth::Service(_) | Auth::Admin(_) | Auth::Staff(_) => true,
            Auth::User(_) => false,
            Auth::None => false,
        }
    }
}
