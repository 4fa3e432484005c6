use sea_orm::DatabaseConnection;

use super::{
    AttendanceDao, ClassDao, DaoBase, GradeDao, ReportDao, StudentDao, TeacherDao,
};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn student(&self) -> StudentDao {
        DaoBase::new(&self.db)
    }

    pub fn teacher(&self) -> TeacherDao {
        DaoBase::new(&self.db)
    }

    pub fn school_class(&self) -> ClassDao {
        DaoBase::new(&self.db)
    }

    pub fn grade(&self) -> GradeDao {
        DaoBase::new(&self.db)
    }

    pub fn attendance(&self) -> AttendanceDao {
        DaoBase::new(&self.db)
    }

    pub fn report(&self) -> ReportDao {
        ReportDao::new(&self.db)
    }
}
