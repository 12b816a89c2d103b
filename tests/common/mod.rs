//! In-memory repository implementations backing the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bson::oid::ObjectId;

use projecthub_backend::model::catalog::{ProjectTemplate, ServicePackage};
use projecthub_backend::model::project::{
    MilestoneStatus, Project, ProjectMilestone, ProjectStatus,
};
use projecthub_backend::model::request::{ProjectRequest, RequestStatus, UserType};
use projecthub_backend::repository::milestone_repo::MilestoneRepository;
use projecthub_backend::repository::package_repo::ServicePackageRepository;
use projecthub_backend::repository::project_repo::ProjectRepository;
use projecthub_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use projecthub_backend::repository::request_repo::{ProjectRequestRepository, RequestListFilter};
use projecthub_backend::repository::template_repo::TemplateRepository;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .try_init();
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[derive(Default)]
pub struct InMemoryRequestRepo {
    pub requests: Mutex<HashMap<ObjectId, ProjectRequest>>,
}

impl InMemoryRequestRepo {
    pub fn insert(&self, request: ProjectRequest) -> ObjectId {
        let id = request.id.unwrap_or_else(ObjectId::new);
        let mut request = request;
        request.id = Some(id);
        self.requests.lock().unwrap().insert(id, request);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<ProjectRequest> {
        self.requests.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ProjectRequestRepository for InMemoryRequestRepo {
    async fn create(&self, request: ProjectRequest) -> RepositoryResult<ProjectRequest> {
        let mut request = request;
        request.id = Some(ObjectId::new());
        request.status = RequestStatus::Pending;
        request.created_at = Some(now());
        request.updated_at = Some(now());
        self.requests
            .lock()
            .unwrap()
            .insert(request.id.unwrap(), request.clone());
        Ok(request)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ProjectRequest> {
        self.get(id)
            .ok_or_else(|| RepositoryError::not_found(format!("Request not found: {}", id)))
    }

    async fn list(
        &self,
        filter: RequestListFilter,
        _page: u32,
        _limit: u32,
    ) -> RepositoryResult<Vec<ProjectRequest>> {
        let requests = self.requests.lock().unwrap();
        Ok(requests
            .values()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.user_type.map_or(true, |u| r.user_type == u))
            .filter(|r| filter.request_type.map_or(true, |t| r.request_type == t))
            .cloned()
            .collect())
    }

    async fn transition_status(
        &self,
        id: ObjectId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> RepositoryResult<Option<ProjectRequest>> {
        let mut requests = self.requests.lock().unwrap();
        match requests.get_mut(&id) {
            Some(r) if r.status == from => {
                r.status = to;
                r.updated_at = Some(now());
                Ok(Some(r.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn apply_quote(
        &self,
        id: ObjectId,
        quoted_price: i64,
    ) -> RepositoryResult<Option<ProjectRequest>> {
        let mut requests = self.requests.lock().unwrap();
        match requests.get_mut(&id) {
            Some(r) if r.status == RequestStatus::Reviewing => {
                r.status = RequestStatus::Quoted;
                r.quoted_price = Some(quoted_price);
                r.updated_at = Some(now());
                Ok(Some(r.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn apply_rejection(
        &self,
        id: ObjectId,
        from: RequestStatus,
        note: Option<String>,
    ) -> RepositoryResult<Option<ProjectRequest>> {
        let mut requests = self.requests.lock().unwrap();
        match requests.get_mut(&id) {
            Some(r) if r.status == from => {
                r.status = RequestStatus::Rejected;
                if note.is_some() {
                    r.internal_notes = note;
                }
                r.updated_at = Some(now());
                Ok(Some(r.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn reset_to_pending(&self, id: ObjectId) -> RepositoryResult<Option<ProjectRequest>> {
        let mut requests = self.requests.lock().unwrap();
        match requests.get_mut(&id) {
            Some(r) if r.status == RequestStatus::Rejected => {
                r.status = RequestStatus::Pending;
                r.quoted_price = None;
                r.updated_at = Some(now());
                Ok(Some(r.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_converted(
        &self,
        id: ObjectId,
        project_id: ObjectId,
    ) -> RepositoryResult<Option<ProjectRequest>> {
        let mut requests = self.requests.lock().unwrap();
        match requests.get_mut(&id) {
            Some(r)
                if r.status == RequestStatus::Approved && r.converted_project_id.is_none() =>
            {
                r.status = RequestStatus::Converted;
                r.converted_project_id = Some(project_id);
                r.updated_at = Some(now());
                Ok(Some(r.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn revert_conversion(&self, id: ObjectId) -> RepositoryResult<Option<ProjectRequest>> {
        let mut requests = self.requests.lock().unwrap();
        match requests.get_mut(&id) {
            Some(r) if r.status == RequestStatus::Converted => {
                r.status = RequestStatus::Approved;
                r.converted_project_id = None;
                r.updated_at = Some(now());
                Ok(Some(r.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct InMemoryProjectRepo {
    pub projects: Mutex<HashMap<ObjectId, Project>>,
}

impl InMemoryProjectRepo {
    pub fn count(&self) -> usize {
        self.projects.lock().unwrap().len()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepo {
    async fn create(&self, project: Project) -> RepositoryResult<Project> {
        let mut project = project;
        project.id = Some(ObjectId::new());
        project.created_at = Some(now());
        project.updated_at = Some(now());
        self.projects
            .lock()
            .unwrap()
            .insert(project.id.unwrap(), project.clone());
        Ok(project)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Project> {
        self.projects
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Project not found: {}", id)))
    }

    async fn list(
        &self,
        status: Option<ProjectStatus>,
        _page: u32,
        _limit: u32,
    ) -> RepositoryResult<Vec<Project>> {
        let projects = self.projects.lock().unwrap();
        Ok(projects
            .values()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect())
    }

    async fn update_progress(&self, id: ObjectId, progress: u32) -> RepositoryResult<Project> {
        let mut projects = self.projects.lock().unwrap();
        let project = projects
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("Project not found: {}", id)))?;
        project.set_progress(progress);
        project.updated_at = Some(now());
        Ok(project.clone())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        self.projects
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(format!("Project not found: {}", id)))
    }
}

#[derive(Default)]
pub struct InMemoryMilestoneRepo {
    pub milestones: Mutex<HashMap<ObjectId, ProjectMilestone>>,
    /// When set, create_many fails. Used to exercise the conversion
    /// compensation path.
    pub fail_create: AtomicBool,
}

impl InMemoryMilestoneRepo {
    pub fn count(&self) -> usize {
        self.milestones.lock().unwrap().len()
    }

    pub fn insert(&self, milestone: ProjectMilestone) -> ObjectId {
        let id = milestone.id.unwrap_or_else(ObjectId::new);
        let mut milestone = milestone;
        milestone.id = Some(id);
        self.milestones.lock().unwrap().insert(id, milestone);
        id
    }
}

#[async_trait]
impl MilestoneRepository for InMemoryMilestoneRepo {
    async fn create_many(
        &self,
        milestones: Vec<ProjectMilestone>,
    ) -> RepositoryResult<Vec<ProjectMilestone>> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RepositoryError::database("Injected milestone write failure"));
        }
        let mut stored = self.milestones.lock().unwrap();
        let mut created = Vec::with_capacity(milestones.len());
        for mut m in milestones {
            m.id = Some(ObjectId::new());
            m.created_at = Some(now());
            m.updated_at = Some(now());
            stored.insert(m.id.unwrap(), m.clone());
            created.push(m);
        }
        Ok(created)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ProjectMilestone> {
        self.milestones
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Milestone not found: {}", id)))
    }

    async fn list_by_project(
        &self,
        project_id: ObjectId,
    ) -> RepositoryResult<Vec<ProjectMilestone>> {
        let milestones = self.milestones.lock().unwrap();
        let mut result: Vec<ProjectMilestone> = milestones
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        result.sort_by_key(|m| m.order);
        Ok(result)
    }

    async fn update_status(
        &self,
        id: ObjectId,
        status: MilestoneStatus,
    ) -> RepositoryResult<ProjectMilestone> {
        let mut milestones = self.milestones.lock().unwrap();
        let milestone = milestones
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("Milestone not found: {}", id)))?;
        milestone.status = status;
        milestone.completed_date = if status.is_done() {
            Some(chrono::Utc::now().date_naive())
        } else {
            None
        };
        milestone.updated_at = Some(now());
        Ok(milestone.clone())
    }

    async fn delete_by_project(&self, project_id: ObjectId) -> RepositoryResult<u64> {
        let mut milestones = self.milestones.lock().unwrap();
        let before = milestones.len();
        milestones.retain(|_, m| m.project_id != project_id);
        Ok((before - milestones.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryTemplateRepo {
    pub templates: Mutex<HashMap<ObjectId, ProjectTemplate>>,
}

impl InMemoryTemplateRepo {
    pub fn insert(&self, template: ProjectTemplate) -> ObjectId {
        let id = template.id.unwrap_or_else(ObjectId::new);
        let mut template = template;
        template.id = Some(id);
        self.templates.lock().unwrap().insert(id, template);
        id
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepo {
    async fn create(&self, template: ProjectTemplate) -> RepositoryResult<ProjectTemplate> {
        let mut template = template;
        template.id = Some(ObjectId::new());
        template.created_at = Some(now());
        template.updated_at = Some(now());
        self.templates
            .lock()
            .unwrap()
            .insert(template.id.unwrap(), template.clone());
        Ok(template)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ProjectTemplate> {
        self.templates
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Template not found: {}", id)))
    }

    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<ProjectTemplate>> {
        Ok(self.templates.lock().unwrap().get(&id).cloned())
    }

    async fn list_active(&self) -> RepositoryResult<Vec<ProjectTemplate>> {
        let templates = self.templates.lock().unwrap();
        Ok(templates.values().filter(|t| t.is_active).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryPackageRepo {
    pub packages: Mutex<HashMap<ObjectId, ServicePackage>>,
}

impl InMemoryPackageRepo {
    pub fn insert(&self, package: ServicePackage) -> ObjectId {
        let id = package.id.unwrap_or_else(ObjectId::new);
        let mut package = package;
        package.id = Some(id);
        self.packages.lock().unwrap().insert(id, package);
        id
    }
}

#[async_trait]
impl ServicePackageRepository for InMemoryPackageRepo {
    async fn create(&self, package: ServicePackage) -> RepositoryResult<ServicePackage> {
        let mut package = package;
        package.id = Some(ObjectId::new());
        package.created_at = Some(now());
        package.updated_at = Some(now());
        self.packages
            .lock()
            .unwrap()
            .insert(package.id.unwrap(), package.clone());
        Ok(package)
    }

    async fn list_active(
        &self,
        user_type: Option<UserType>,
    ) -> RepositoryResult<Vec<ServicePackage>> {
        let packages = self.packages.lock().unwrap();
        Ok(packages
            .values()
            .filter(|p| p.is_active)
            .filter(|p| user_type.map_or(true, |u| p.user_type == u))
            .cloned()
            .collect())
    }

    async fn find_active_by_ids(
        &self,
        ids: &[ObjectId],
        user_type: UserType,
    ) -> RepositoryResult<Vec<ServicePackage>> {
        let packages = self.packages.lock().unwrap();
        // An $in query matches each document once no matter how often
        // its id repeats in the list.
        let mut seen = std::collections::HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| packages.get(id))
            .filter(|p| p.is_active && p.user_type == user_type)
            .cloned()
            .collect())
    }
}

// -- builders ------------------------------------------------------------

pub fn sample_request(status: RequestStatus) -> ProjectRequest {
    use projecthub_backend::model::request::{ComplexityLevel, RequestType};
    ProjectRequest {
        id: None,
        title: "Inventory dashboard".to_string(),
        description: "A dashboard for tracking warehouse inventory levels".to_string(),
        requirements: None,
        user_type: UserType::Client,
        request_type: RequestType::New,
        template_id: None,
        complexity_level: ComplexityLevel::Medium,
        selected_services: vec![],
        preferred_technologies: vec!["rust".to_string()],
        customizations: None,
        course_category: None,
        academic_level: None,
        institution: None,
        budget_range: None,
        preferred_deadline: None,
        contact_name: "Jordan Smith".to_string(),
        contact_email: "jordan@example.com".to_string(),
        contact_phone: None,
        submitter: None,
        status,
        estimated_cost: Some(120_000),
        quoted_price: None,
        internal_notes: None,
        converted_project_id: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn sample_template(base: i64) -> ProjectTemplate {
    ProjectTemplate {
        id: None,
        title: "E-commerce Starter".to_string(),
        slug: "e-commerce-starter".to_string(),
        description: "Storefront with cart and checkout".to_string(),
        category: "web".to_string(),
        technologies: vec!["rust".to_string()],
        features: vec!["cart".to_string()],
        base_price: base,
        student_price: None,
        client_price: None,
        business_price: None,
        is_active: true,
        is_featured: false,
        created_at: None,
        updated_at: None,
    }
}

pub fn sample_package(user_type: UserType, price: i64) -> ServicePackage {
    ServicePackage {
        id: None,
        name: "Deployment".to_string(),
        description: "Production deployment and handover".to_string(),
        user_type,
        price,
        features: vec![],
        is_active: true,
        order: 1,
        created_at: None,
        updated_at: None,
    }
}
