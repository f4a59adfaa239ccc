//! Integration tests for `SqliteStore` and the access layer on top of it,
//! against an in-memory database.

use std::{sync::Arc, time::Duration};

use atelier_core::{
  Error as CoreError,
  client::StoreClient,
  dashboard, demo,
  entity::{ContactMessage, GalleryImage, Project, ProjectCategory, Testimonial},
  events::ErrorBus,
  live::{Snapshot, Subscription},
  record::{Collection, Record, Sort, SortField},
  rules::{Access, Operation},
  site::{SITE_CONTENT_ID, SiteContent},
  store::{DocumentStore, WriteBatch},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn category(name: &str, order: i64) -> ProjectCategory {
  ProjectCategory { name: name.into(), order }
}

fn project(title: &str, category_id: &str, order: i64) -> Project {
  Project {
    title:               title.into(),
    description:         format!("About {title}"),
    project_category_id: category_id.into(),
    image_url:           "https://example.com/p.png".into(),
    project_images:      vec![],
    tools_used:          "Figma".into(),
    order,
    problem:             None,
    solution:            None,
    outcome:             None,
  }
}

fn testimonial(name: &str) -> Testimonial {
  Testimonial {
    name:      name.into(),
    role:      "Founder".into(),
    company:   None,
    content:   "Lovely work".into(),
    image_url: None,
    order:     1,
  }
}

fn message(name: &str) -> ContactMessage {
  ContactMessage {
    name:    name.into(),
    email:   "ada@example.com".into(),
    message: "Hello".into(),
    is_read: false,
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_document() {
  let s = store().await;

  let created = s.insert(None, category("Branding", 1)).await.unwrap();
  assert_eq!(created.created_at, created.updated_at);

  let fetched = s.get::<ProjectCategory>(created.id.clone()).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get::<Project>("nope".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn insert_with_taken_id_fails() {
  let s = store().await;
  s.insert(Some("c1".into()), category("A", 1)).await.unwrap();
  let err = s.insert(Some("c1".into()), category("B", 2)).await.unwrap_err();
  assert!(matches!(err, Error::DocumentExists(path) if path == "projectCategories/c1"));
}

#[tokio::test]
async fn collections_are_isolated() {
  let s = store().await;
  s.insert(Some("x".into()), category("A", 1)).await.unwrap();
  assert!(s.get::<Project>("x".into()).await.unwrap().is_none());
  assert!(s.list_ids(Collection::Projects).await.unwrap().is_empty());
}

// ─── Ordering ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_orders_by_order_field_then_insertion() {
  let s = store().await;
  s.insert(None, project("Third", "c", 3)).await.unwrap();
  s.insert(None, project("First", "c", 1)).await.unwrap();
  s.insert(None, project("Second A", "c", 2)).await.unwrap();
  s.insert(None, project("Second B", "c", 2)).await.unwrap();

  let titles: Vec<_> = s
    .list::<Project>(Project::DEFAULT_SORT)
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.data.title)
    .collect();
  assert_eq!(titles, ["First", "Second A", "Second B", "Third"]);
}

#[tokio::test]
async fn list_orders_by_name_case_insensitively() {
  let s = store().await;
  for (name, order) in [("packaging", 1), ("Branding", 2), ("Digital", 3)] {
    s.insert(None, category(name, order)).await.unwrap();
  }
  let names: Vec<_> = s
    .list::<ProjectCategory>(Sort::asc(SortField::Name))
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.data.name)
    .collect();
  assert_eq!(names, ["Branding", "Digital", "packaging"]);
}

#[tokio::test]
async fn messages_list_newest_first() {
  let s = store().await;
  s.insert(None, message("older")).await.unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;
  s.insert(None, message("newer")).await.unwrap();

  let names: Vec<_> = s
    .list::<ContactMessage>(ContactMessage::DEFAULT_SORT)
    .await
    .unwrap()
    .into_iter()
    .map(|m| m.data.name)
    .collect();
  assert_eq!(names, ["newer", "older"]);
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_keeps_created_at_and_bumps_updated_at() {
  let s = store().await;
  let created = s.insert(None, project("Aura", "c", 1)).await.unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;

  let mut edited = created.data.clone();
  edited.title = "Aura Branding".into();
  let updated = s.update(created.id.clone(), edited).await.unwrap().unwrap();

  assert_eq!(updated.data.title, "Aura Branding");
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn update_of_missing_document_returns_none() {
  let s = store().await;
  assert!(s.update("ghost".into(), category("A", 1)).await.unwrap().is_none());
  assert!(s.list_ids(Collection::ProjectCategories).await.unwrap().is_empty());
}

#[tokio::test]
async fn upsert_creates_then_merges() {
  let s = store().await;
  let mut content = SiteContent::default();
  content.hero.title = "Studio".into();
  let first = s.upsert(SITE_CONTENT_ID.into(), content.clone()).await.unwrap();
  assert_eq!(first.created_at, first.updated_at);

  content.is_maintenance_mode_enabled = true;
  let second = s.upsert(SITE_CONTENT_ID.into(), content).await.unwrap();
  assert_eq!(second.created_at, first.created_at);
  assert!(second.data.is_maintenance_mode_enabled);
  assert_eq!(second.data.hero.title, "Studio");
}

#[tokio::test]
async fn newer_schema_versions_are_refused() {
  let s = store().await;
  let created = s.insert(None, category("A", 1)).await.unwrap();
  s.set_schema_version(Collection::ProjectCategories, &created.id, 2).await.unwrap();

  let err = s.get::<ProjectCategory>(created.id.clone()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::UnsupportedVersion { found: 2, known: 1, .. })
  ));
  let err = s.update(created.id, category("B", 2)).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UnsupportedVersion { .. })));
}

// ─── Deletes and soft references ─────────────────────────────────────────────

#[tokio::test]
async fn deleting_a_category_leaves_its_projects() {
  let s = store().await;
  let cat = s.insert(None, category("Branding", 1)).await.unwrap();
  let p = s.insert(None, project("Aura", &cat.id, 1)).await.unwrap();

  assert!(s.delete(Collection::ProjectCategories, cat.id.clone()).await.unwrap());
  assert!(!s.delete(Collection::ProjectCategories, cat.id.clone()).await.unwrap());

  let orphan = s.get::<Project>(p.id).await.unwrap().unwrap();
  assert_eq!(orphan.data.project_category_id, cat.id);
}

// ─── Batches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn commit_applies_puts_and_deletes_together() {
  let s = store().await;
  let old = s.insert(None, category("Old", 1)).await.unwrap();

  let mut batch = WriteBatch::new();
  batch.put("new", &category("New", 2)).unwrap();
  batch.delete(Collection::ProjectCategories, old.id.clone());
  s.commit(batch).await.unwrap();

  assert!(s.get::<ProjectCategory>(old.id).await.unwrap().is_none());
  let new = s.get::<ProjectCategory>("new".into()).await.unwrap().unwrap();
  assert_eq!(new.created_at, new.updated_at);
}

#[tokio::test]
async fn commit_put_keeps_created_at_of_existing_document() {
  let s = store().await;
  let original = s.insert(Some("c".into()), category("A", 1)).await.unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;

  let mut batch = WriteBatch::new();
  batch.put("c", &category("B", 1)).unwrap();
  s.commit(batch).await.unwrap();

  let after = s.get::<ProjectCategory>("c".into()).await.unwrap().unwrap();
  assert_eq!(after.data.name, "B");
  assert_eq!(after.created_at, original.created_at);
  assert!(after.updated_at > original.updated_at);
}

// ─── Change feed ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn writes_are_announced_on_the_change_feed() {
  let s = store().await;
  let mut changes = s.subscribe();

  let created = s.insert(None, testimonial("Mina")).await.unwrap();
  let change = changes.recv().await.unwrap();
  assert_eq!(change.collection, Collection::Testimonials);
  assert_eq!(change.id, created.id);

  s.delete(Collection::Testimonials, created.id.clone()).await.unwrap();
  assert_eq!(changes.recv().await.unwrap().id, created.id);
}

// ─── Access layer ────────────────────────────────────────────────────────────

fn client(s: &SqliteStore, access: Access) -> (StoreClient<SqliteStore>, ErrorBus) {
  let bus = ErrorBus::default();
  (StoreClient::new(Arc::new(s.clone()), access, Arc::new(bus.clone())), bus)
}

async fn settled<D: Clone + Send + Sync + 'static>(sub: &mut Subscription<D>) -> Snapshot<D> {
  loop {
    let snap = tokio::time::timeout(Duration::from_secs(5), sub.next())
      .await
      .expect("timed out waiting for a snapshot")
      .expect("subscription ended");
    if !snap.loading {
      return snap;
    }
  }
}

#[tokio::test]
async fn public_cannot_read_messages_and_an_event_is_published() {
  let s = store().await;
  let (public, bus) = client(&s, Access::Public);
  let mut events = bus.subscribe();

  let err = public.list::<ContactMessage>().await.unwrap_err();
  assert!(err.is_permission_denied());

  let event = events.recv().await.unwrap();
  assert_eq!(event.path, "contactMessages");
  assert_eq!(event.operation, Operation::List);
  assert!(event.permission);
  assert_eq!(event.toast().title, "Permission Denied");
}

#[tokio::test]
async fn public_may_leave_a_message_but_not_edit_projects() {
  let s = store().await;
  let (public, bus) = client(&s, Access::Public);
  let mut events = bus.subscribe();

  let saved = public.save(None, message("Ada")).await.unwrap();
  assert!(!saved.data.is_read);

  let err = public.save(None, project("Hack", "c", 1)).await.unwrap_err();
  assert!(err.is_permission_denied());
  let event = events.recv().await.unwrap();
  assert_eq!(event.operation, Operation::Create);
  assert_eq!(event.request_payload.unwrap()["title"], "Hack");
}

#[tokio::test]
async fn submitted_writes_complete_in_the_background() {
  let s = store().await;
  let (admin, _) = client(&s, Access::Admin);

  let pending = admin.submit(None, testimonial("Mina"));
  let id = pending.id.clone();
  pending.settled().await.unwrap();

  let stored = admin.get::<Testimonial>(&id).await.unwrap().unwrap();
  assert_eq!(stored.data.name, "Mina");

  admin.remove(Collection::Testimonials, id.clone()).settled().await.unwrap();
  assert!(admin.get::<Testimonial>(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn rejected_background_write_reaches_the_bus() {
  let s = store().await;
  let (public, bus) = client(&s, Access::Public);
  let mut events = bus.subscribe();

  let pending = public.submit(None, testimonial("Eve"));
  assert!(pending.settled().await.unwrap_err().is_permission_denied());
  assert_eq!(events.recv().await.unwrap().operation, Operation::Create);
}

#[tokio::test]
async fn watching_nothing_opens_no_listener() {
  let s = store().await;
  let (admin, _) = client(&s, Access::Admin);
  let mut sub = admin.watch_doc::<SiteContent>(None);
  assert!(!sub.is_listening());
  assert_eq!(sub.next().await, Some(Snapshot::idle()));
}

#[tokio::test]
async fn query_subscription_follows_writes() {
  let s = store().await;
  let (admin, _) = client(&s, Access::Admin);
  let mut sub = admin.watch_query::<Testimonial>(Some(Testimonial::DEFAULT_SORT));

  let first = settled(&mut sub).await;
  assert_eq!(first.data.map(|d| d.len()), Some(0));

  admin.save(None, testimonial("Mina")).await.unwrap();
  let second = settled(&mut sub).await;
  assert_eq!(second.data.unwrap()[0].data.name, "Mina");
}

#[tokio::test]
async fn doc_subscription_sees_missing_then_created() {
  let s = store().await;
  let (admin, _) = client(&s, Access::Admin);
  let mut sub = admin.watch_doc::<SiteContent>(Some(SITE_CONTENT_ID.into()));

  assert_eq!(settled(&mut sub).await.data, None);

  admin.save(Some(SITE_CONTENT_ID.into()), SiteContent::default()).await.unwrap();
  assert!(settled(&mut sub).await.data.is_some());
}

#[tokio::test]
async fn denied_subscription_ends_with_an_error() {
  let s = store().await;
  let (public, bus) = client(&s, Access::Public);
  let mut events = bus.subscribe();
  let mut sub = public.watch_query::<ContactMessage>(Some(ContactMessage::DEFAULT_SORT));

  let snap = settled(&mut sub).await;
  assert!(snap.error.is_some());
  assert!(snap.data.is_none());
  assert!(events.recv().await.unwrap().permission);
}

// ─── Demo data and dashboard ─────────────────────────────────────────────────

#[tokio::test]
async fn demo_fill_then_reset_leaves_other_collections() {
  let s = store().await;
  let (admin, _) = client(&s, Access::Admin);
  admin.save(None, testimonial("Mina")).await.unwrap();
  admin.save(None, message("Ada")).await.unwrap();
  admin.save(Some(SITE_CONTENT_ID.into()), SiteContent::default()).await.unwrap();
  admin
    .save(None, GalleryImage {
      title:               "Poster".into(),
      image_url:           "https://example.com/g.png".into(),
      gallery_category_id: "gone".into(),
      order:               1,
    })
    .await
    .unwrap();

  let filled = demo::fill(&admin).await.unwrap();
  let projects = admin.list::<Project>().await.unwrap();
  let categories = admin.list::<ProjectCategory>().await.unwrap();
  assert_eq!(projects.len(), filled.projects);
  assert_eq!(categories.len(), filled.categories);
  let aura = projects.iter().find(|p| p.data.title == "Aura Branding").unwrap();
  let branding = categories.iter().find(|c| c.data.name == "Branding").unwrap();
  assert_eq!(aura.data.project_category_id, branding.id);

  let reset = demo::reset(&admin).await.unwrap();
  assert_eq!(reset.deleted, filled.projects + filled.categories + 1);
  for collection in demo::RESET_COLLECTIONS {
    assert!(admin.list_ids(collection).await.unwrap().is_empty());
  }
  assert_eq!(admin.list::<Testimonial>().await.unwrap().len(), 1);
  assert_eq!(admin.list::<ContactMessage>().await.unwrap().len(), 1);
  assert!(admin.get::<SiteContent>(SITE_CONTENT_ID).await.unwrap().is_some());
}

#[tokio::test]
async fn public_cannot_run_demo_batches() {
  let s = store().await;
  let (public, _) = client(&s, Access::Public);
  assert!(demo::fill(&public).await.unwrap_err().is_permission_denied());
  assert!(s.list_ids(Collection::Projects).await.unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_counts_unread_and_orphans() {
  let s = store().await;
  let (admin, _) = client(&s, Access::Admin);
  let cat = admin.save(None, category("Branding", 1)).await.unwrap();
  admin.save(None, project("Aura", &cat.id, 1)).await.unwrap();
  admin.save(None, project("Lost", "deleted", 2)).await.unwrap();
  let read = admin.save(None, message("Ada")).await.unwrap();
  admin.save(None, message("Bo")).await.unwrap();
  admin
    .update(&read.id, ContactMessage { is_read: true, ..read.data.clone() })
    .await
    .unwrap();

  let d = dashboard::load(&admin).await.unwrap();
  assert_eq!(d.projects, 2);
  assert_eq!(d.messages, 2);
  assert_eq!(d.unread_messages, 1);
  assert_eq!(d.projects_per_category.len(), 2);
  assert!(d.projects_per_category.iter().any(|c| c.name == "N/A" && c.count == 1));
}
