use chrono::NaiveDateTime;
use serde_yaml::{Mapping, Value};
use wp2grav_core::contract::{
    CustomFieldRecord, EntityStatus, SiteInfo, SourceEntity, SourceRole, SourceUser,
};
use wp2grav_core::document::{
    account_document, authenticated_group_entry, blueprint_document, group_entry, page_document,
    site_document, yaml_str, Document,
};
use wp2grav_core::fields::MappedField;

fn naive(date: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S").expect("well-formed test date")
}

fn get<'a>(map: &'a Mapping, key: &str) -> &'a Value {
    map.get(&Value::from(key))
        .unwrap_or_else(|| panic!("missing header key {key}"))
}

fn get_map<'a>(map: &'a Mapping, key: &str) -> &'a Mapping {
    get(map, key)
        .as_mapping()
        .unwrap_or_else(|| panic!("header key {key} is not a mapping"))
}

fn keys(map: &Mapping) -> Vec<&str> {
    map.iter().filter_map(|(k, _)| k.as_str()).collect()
}

fn entity(status: EntityStatus) -> SourceEntity {
    SourceEntity {
        id: 11,
        slug: Some("hello-world".to_string()),
        type_key: "post".to_string(),
        status,
        title: "Hello world".to_string(),
        guid: "https://example.com/?p=11".to_string(),
        body: String::new(),
        date: naive("2024-01-01 00:00:00"),
        modified: naive("2024-02-03 10:30:00"),
        author_id: 5,
        author: Some("jane".to_string()),
        excerpt: None,
        categories: vec!["News".to_string()],
        tags: vec!["intro".to_string(), "intro".to_string()],
        meta: Mapping::new(),
        media: Vec::new(),
    }
}

fn user() -> SourceUser {
    SourceUser {
        id: 5,
        login: "jane".to_string(),
        email: "jane@example.com".to_string(),
        display_name: Some("Jane D".to_string()),
        nickname: Some("janed".to_string()),
        description: Some("Edits things".to_string()),
        first_name: Some("Jane".to_string()),
        last_name: Some("Doe".to_string()),
        url: Some("https://jane.example.com".to_string()),
        locale: Some("en_US".to_string()),
        roles: vec!["editor".to_string()],
    }
}

#[test]
fn test_set_overwrites_instead_of_duplicating() {
    let mut doc = Document::new();
    doc.set("title", yaml_str("first"));
    doc.set("title", yaml_str("second"));

    assert_eq!(doc.header().len(), 1, "re-setting a key should not add one");
    assert_eq!(get(doc.header(), "title"), &Value::from("second"));
}

#[test]
fn test_set_path_creates_intermediates_and_replaces_scalars_in_the_way() {
    let mut doc = Document::new();
    doc.set_path(&["wp", "post", "ID"], Value::from(7));
    let post = get_map(get_map(doc.header(), "wp"), "post");
    assert_eq!(get(post, "ID"), &Value::from(7));

    doc.set("flat", yaml_str("scalar"));
    doc.set_path(&["flat", "inner"], yaml_str("nested"));
    assert_eq!(
        get(get_map(doc.header(), "flat"), "inner"),
        &Value::from("nested"),
        "a scalar blocking the path should give way to a mapping"
    );
}

#[test]
fn test_push_path_appends_preserving_order_and_duplicates() {
    let mut doc = Document::new();
    doc.push_path(&["taxonomy", "tag"], yaml_str("a"));
    doc.push_path(&["taxonomy", "tag"], yaml_str("b"));
    doc.push_path(&["taxonomy", "tag"], yaml_str("a"));

    let tags = get(get_map(doc.header(), "taxonomy"), "tag");
    assert_eq!(
        tags,
        &Value::Sequence(vec![yaml_str("a"), yaml_str("b"), yaml_str("a")]),
        "pushed values should keep their order, duplicates included"
    );
}

#[test]
fn test_bare_yaml_has_no_fences_and_frontmatter_does() {
    let mut doc = Document::new();
    doc.set("title", yaml_str("T"));

    assert_eq!(doc.to_yaml().expect("serializable"), "title: T\n");

    doc.set_body("Hello".to_string());
    assert_eq!(
        doc.to_frontmatter().expect("serializable"),
        "---\ntitle: T\n---\nHello\n",
        "pages are fenced front-matter plus the body with a final newline"
    );
}

#[test]
fn test_frontmatter_does_not_double_the_final_newline() {
    let mut doc = Document::new();
    doc.set("title", yaml_str("T"));
    doc.set_body("Hello\n".to_string());
    assert!(doc.to_frontmatter().expect("serializable").ends_with("Hello\n"));
    assert!(!doc.to_frontmatter().expect("serializable").ends_with("Hello\n\n"));
}

#[test]
fn test_account_document_writes_keys_in_the_fixed_order() {
    let doc = account_document(&user(), "en", &["wp_editor".to_string()], "s3cret");

    assert_eq!(
        keys(doc.header()),
        vec!["email", "wp", "fullname", "title", "state", "language", "groups", "password"]
    );
    let wp = get_map(doc.header(), "wp");
    assert_eq!(
        keys(wp),
        vec![
            "id",
            "user_url",
            "display_name",
            "nickname",
            "description",
            "first_name",
            "last_name"
        ],
        "profile keys should keep their fixed order inside wp"
    );
    assert_eq!(get(doc.header(), "title"), &Value::Null);
    assert_eq!(get(doc.header(), "state"), &Value::from("enabled"));
    assert_eq!(
        get(doc.header(), "groups"),
        &Value::Sequence(vec![yaml_str("wp_editor")])
    );
    assert_eq!(get(doc.header(), "password"), &Value::from("s3cret"));
}

#[test]
fn test_account_fullname_prefers_nickname_then_display_name_then_login() {
    let full = user();
    assert_eq!(
        get(account_document(&full, "en", &[], "x").header(), "fullname"),
        &Value::from("janed")
    );

    let mut no_nickname = user();
    no_nickname.nickname = None;
    assert_eq!(
        get(account_document(&no_nickname, "en", &[], "x").header(), "fullname"),
        &Value::from("Jane D")
    );

    let mut bare = user();
    bare.nickname = None;
    bare.display_name = None;
    assert_eq!(
        get(account_document(&bare, "en", &[], "x").header(), "fullname"),
        &Value::from("jane"),
        "with no profile names the login itself is the fullname"
    );
}

#[test]
fn test_account_document_omits_absent_profile_keys() {
    let minimal = SourceUser {
        id: 9,
        login: "sam".to_string(),
        email: "sam@example.com".to_string(),
        display_name: None,
        nickname: None,
        description: None,
        first_name: None,
        last_name: None,
        url: None,
        locale: None,
        roles: Vec::new(),
    };
    let doc = account_document(&minimal, "en", &[], "x");
    assert_eq!(
        keys(get_map(doc.header(), "wp")),
        vec!["id"],
        "absent profile values should be omitted, not written empty"
    );
}

#[test]
fn test_group_entry_for_a_plain_role() {
    let role = SourceRole {
        key: "shop_manager".to_string(),
        label: "Shop Manager".to_string(),
    };
    let (key, value) = group_entry(&role);
    assert_eq!(key, "wp_shop_manager");

    let entry = value.as_mapping().expect("group entry is a mapping");
    assert_eq!(get(entry, "icon"), &Value::from("cog"));
    assert_eq!(
        get(entry, "readableName"),
        &Value::from("Shop_Manager"),
        "the display name should get the same space conversion as the key"
    );
    assert_eq!(
        get(entry, "description"),
        &Value::from("Exported Wordpress role shop_manager")
    );
    let access = get_map(entry, "access");
    assert_eq!(get(get_map(access, "site"), "login"), &Value::from(true));
    assert!(
        !access.contains_key(&Value::from("admin")),
        "only administrators receive admin panel access"
    );
}

#[test]
fn test_administrator_group_receives_admin_access() {
    let role = SourceRole {
        key: "administrator".to_string(),
        label: "Administrator".to_string(),
    };
    let (key, value) = group_entry(&role);
    assert_eq!(key, "wp_administrator");

    let entry = value.as_mapping().expect("group entry is a mapping");
    let admin = get_map(get_map(entry, "access"), "admin");
    assert_eq!(get(admin, "login"), &Value::from(true));
    assert_eq!(get(admin, "super"), &Value::from(true));
}

#[test]
fn test_authenticated_group_entry_grants_site_login_only() {
    let (key, value) = authenticated_group_entry();
    assert_eq!(key, "wp_authenticated_user");

    let entry = value.as_mapping().expect("group entry is a mapping");
    assert_eq!(get(entry, "readableName"), &Value::from("Authenticated_User"));
    assert_eq!(
        get(entry, "description"),
        &Value::from("Exported Wordpress role authenticated_user")
    );
    let access = get_map(entry, "access");
    assert_eq!(get(get_map(access, "site"), "login"), &Value::from(true));
    assert!(!access.contains_key(&Value::from("admin")));
}

#[test]
fn test_blueprint_without_fields_is_just_the_title() {
    let doc = blueprint_document("post", &[], &[]);
    assert_eq!(keys(doc.header()), vec!["title"]);
    assert_eq!(get(doc.header(), "title"), &Value::from("post"));
}

#[test]
fn test_blueprint_tabs_carry_content_and_plugin_fields() {
    let content = vec![("header.title".to_string(), yaml_str("t"))];
    let extra = vec![("header.price".to_string(), yaml_str("p"))];
    let doc = blueprint_document("product", &content, &extra);

    let form = get_map(doc.header(), "form");
    let tabs = get_map(get_map(form, "fields"), "tabs");
    assert_eq!(get(tabs, "type"), &Value::from("tabs"));
    assert_eq!(get(tabs, "active"), &Value::from(1));

    let tab_entries = get_map(tabs, "fields");
    let content_tab = get_map(tab_entries, "content");
    assert_eq!(get(content_tab, "type"), &Value::from("tab"));
    assert_eq!(get(content_tab, "title"), &Value::from("Content"));
    assert!(get_map(content_tab, "fields").contains_key(&Value::from("header.title")));

    let plugin_tab = get_map(tab_entries, "wordpress");
    assert_eq!(get(plugin_tab, "title"), &Value::from("Plugin Fields"));
    assert!(get_map(plugin_tab, "fields").contains_key(&Value::from("header.price")));
}

#[test]
fn test_blueprint_omits_an_empty_tab() {
    let content = vec![("header.title".to_string(), yaml_str("t"))];
    let doc = blueprint_document("post", &content, &[]);

    let form = get_map(doc.header(), "form");
    let tab_entries = get_map(get_map(get_map(form, "fields"), "tabs"), "fields");
    assert!(tab_entries.contains_key(&Value::from("content")));
    assert!(
        !tab_entries.contains_key(&Value::from("wordpress")),
        "a type without plugin fields should not get an empty second tab"
    );
}

#[test]
fn test_published_page_writes_publish_date_before_the_flag() {
    let doc = page_document(&entity(EntityStatus::Publish), &[], &[], String::new());
    let header_keys = keys(doc.header());
    let date_at = header_keys.iter().position(|k| *k == "publish_date");
    let flag_at = header_keys.iter().position(|k| *k == "published");
    assert!(
        date_at.expect("publish_date present") < flag_at.expect("published present"),
        "published entities carry publish_date first, then published: true"
    );
    assert_eq!(get(doc.header(), "published"), &Value::from(true));
    assert_eq!(
        get(doc.header(), "publish_date"),
        &Value::from("2024-01-01 00:00:00")
    );
}

#[test]
fn test_scheduled_page_writes_the_flag_before_publish_date() {
    let doc = page_document(&entity(EntityStatus::Future), &[], &[], String::new());
    let header_keys = keys(doc.header());
    let flag_at = header_keys.iter().position(|k| *k == "published");
    let date_at = header_keys.iter().position(|k| *k == "publish_date");
    assert!(flag_at.expect("published present") < date_at.expect("publish_date present"));
    assert_eq!(get(doc.header(), "published"), &Value::from(false));
}

#[test]
fn test_draft_and_trashed_pages_are_unpublished_without_a_date() {
    for status in [EntityStatus::Draft, EntityStatus::Trash] {
        let doc = page_document(&entity(status), &[], &[], String::new());
        assert_eq!(get(doc.header(), "published"), &Value::from(false));
        assert!(
            !doc.header().contains_key(&Value::from("publish_date")),
            "unpublished entities have no publish date"
        );
    }
}

#[test]
fn test_page_dates_use_raw_and_display_formats() {
    let doc = page_document(&entity(EntityStatus::Draft), &[], &[], String::new());
    assert_eq!(
        get(doc.header(), "modified"),
        &Value::from("2024-02-03 10:30:00"),
        "the modification timestamp is kept verbatim"
    );
    assert_eq!(
        get(doc.header(), "date"),
        &Value::from("January 1, 2024"),
        "the page date is the human-readable form without zero padding"
    );
}

#[test]
fn test_page_meta_drops_keys_shadowed_by_custom_fields() {
    let mut source = entity(EntityStatus::Publish);
    source.meta.insert(yaml_str("price"), Value::from("10"));
    source.meta.insert(yaml_str("_price"), yaml_str("field_abc123"));
    source.meta.insert(yaml_str("color"), yaml_str("red"));

    let custom = vec![CustomFieldRecord {
        name: "price".to_string(),
        kind: "number".to_string(),
        value: Value::from(10),
        ..Default::default()
    }];
    let mapped = vec![MappedField {
        name: "price".to_string(),
        descriptor: Value::from(10),
        sidecar: None,
        copy: None,
    }];

    let doc = page_document(&source, &custom, &mapped, String::new());
    let meta = get_map(get_map(doc.header(), "wp"), "meta");
    assert!(
        !meta.contains_key(&Value::from("price")),
        "raw meta shadowed by a custom field should be dropped"
    );
    assert!(!meta.contains_key(&Value::from("_price")));
    assert_eq!(get(meta, "color"), &Value::from("red"));
    assert_eq!(
        get(get_map(meta, "acf"), "price"),
        &Value::from(10),
        "the mapped field lands under the reserved acf namespace"
    );
}

#[test]
fn test_page_taxonomy_keeps_category_and_tag_lists() {
    let doc = page_document(&entity(EntityStatus::Publish), &[], &[], String::new());
    let taxonomy = get_map(doc.header(), "taxonomy");
    assert_eq!(get(taxonomy, "category"), &Value::Sequence(vec![yaml_str("News")]));
    assert_eq!(
        get(taxonomy, "tag"),
        &Value::Sequence(vec![yaml_str("intro"), yaml_str("intro")]),
        "tag duplicates from the source survive the export"
    );
}

#[test]
fn test_page_post_block_keeps_identity_and_attribution() {
    let mut source = entity(EntityStatus::Publish);
    source.excerpt = Some("A greeting".to_string());
    let doc = page_document(&source, &[], &[], String::new());

    let post = get_map(get_map(doc.header(), "wp"), "post");
    assert_eq!(get(post, "ID"), &Value::from(11_u64));
    assert_eq!(get(post, "guid"), &Value::from("https://example.com/?p=11"));
    assert_eq!(get(post, "author_id"), &Value::from(5_u64));
    assert_eq!(get(post, "author"), &Value::from("jane"));
    assert_eq!(get(post, "excerpt"), &Value::from("A greeting"));
}

#[test]
fn test_site_document_with_and_without_description() {
    let site = SiteInfo {
        title: "My Blog".to_string(),
        description: Some("Notes and news".to_string()),
        admin_email: "admin@example.com".to_string(),
        admin_name: Some("Ada".to_string()),
    };
    let doc = site_document(&site, "Ada");
    assert_eq!(get(doc.header(), "title"), &Value::from("My Blog"));
    let author = get_map(doc.header(), "author");
    assert_eq!(get(author, "name"), &Value::from("Ada"));
    assert_eq!(get(author, "email"), &Value::from("admin@example.com"));
    assert_eq!(
        get(get_map(doc.header(), "metadata"), "description"),
        &Value::from("Notes and news")
    );

    let bare = SiteInfo {
        title: "My Blog".to_string(),
        description: None,
        admin_email: "admin@example.com".to_string(),
        admin_name: None,
    };
    let doc = site_document(&bare, "Site Admin");
    assert!(
        !doc.header().contains_key(&Value::from("metadata")),
        "a site without a tagline gets no metadata block"
    );
}
