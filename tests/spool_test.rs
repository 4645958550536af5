use callfile::{
    user::is_superuser, Application, Call, CallFile, CallFileDocument, CallFileError, Config,
    Context,
};
use std::{
    fs,
    os::unix::fs::{MetadataExt, PermissionsExt},
    path::Path,
};

#[test]
fn test_spool_hello_world() {
    let spool = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();

    let callfile = CallFile::new(
        Call::new("SIP/flowroute/18002223333").unwrap(),
        Application::new("Playback", "hello-world").unwrap(),
    )
    .with_spool_dir(spool.path())
    .with_temp_dir(temp.path());

    let expected = callfile.build_file().unwrap();
    let receipt = callfile.spool(None).unwrap();

    assert!(receipt.spool_path.starts_with(spool.path()));
    assert!(!temp.path().join(callfile.filename()).exists());

    let spooled = fs::read_to_string(&receipt.spool_path).unwrap();
    assert_eq!(spooled.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn test_spool_unknown_user() {
    let spool = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();

    let callfile = CallFile::new(
        Call::new("SIP/flowroute/18002223333").unwrap(),
        Context::new("default", "s", "1").unwrap(),
    )
    .with_spool_dir(spool.path())
    .with_temp_dir(temp.path())
    .with_user("definitely-not-a-real-user-xyz");

    match callfile.spool(None) {
        Err(CallFileError::NoUser { user, path }) => {
            assert_eq!(user, "definitely-not-a-real-user-xyz");
            assert!(path.exists());
        }
        other => panic!("expected NoUser, got {:?}", other),
    }
    assert_eq!(fs::read_dir(spool.path()).unwrap().count(), 0);
}

#[test]
fn test_spool_unwritable_spool_dir() {
    if is_superuser() {
        return;
    }
    let spool = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();
    fs::set_permissions(spool.path(), fs::Permissions::from_mode(0o500)).unwrap();

    let callfile = CallFile::new(
        Call::new("SIP/flowroute/18002223333").unwrap(),
        Application::new("Playback", "hello-world").unwrap(),
    )
    .with_spool_dir(spool.path())
    .with_temp_dir(temp.path());
    let result = callfile.spool(None);
    fs::set_permissions(spool.path(), fs::Permissions::from_mode(0o700)).unwrap();

    assert!(matches!(
        result,
        Err(CallFileError::NoSpoolPermission { .. })
    ));
}

#[test]
fn test_spool_from_document() {
    let spool = tempfile::tempdir().unwrap();
    let temp = tempfile::tempdir().unwrap();
    let config = Config {
        spool_dir: spool.path().to_path_buf(),
        temp_dir: Some(temp.path().to_path_buf()),
        ..Default::default()
    };

    let doc = CallFileDocument::parse(
        r#"
filename = "wakeup-101.call"
schedule = "2031-01-01T06:30:00Z"
always_delete = true

[call]
channel = "Local/101@rooms"
retry_time = 300
max_retries = 3

[action]
context = "wakeup"
extension = "s"
priority = "1"

[variables]
room = "101"
"#,
    )
    .unwrap();
    let when = doc.schedule_time().unwrap();
    let receipt = doc.into_callfile(&config).spool(when).unwrap();

    assert_eq!(receipt.spool_path, spool.path().join("wakeup-101.call"));
    assert_eq!(
        fs::read_to_string(&receipt.spool_path).unwrap(),
        "Channel: Local/101@rooms\n\
         RetryTime: 300\n\
         Maxretries: 3\n\
         Context: wakeup\n\
         Extension: s\n\
         Priority: 1\n\
         Set: room=101\n\
         AlwaysDelete: yes\n"
    );
    let mtime = fs::metadata(&receipt.spool_path)
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(
        mtime
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs(),
        1925015400
    );
}

#[test]
fn test_spool_across_filesystems() {
    let shm = Path::new("/dev/shm");
    if !shm.is_dir() {
        return;
    }
    let temp = tempfile::tempdir_in(shm).unwrap();
    let spool = tempfile::tempdir().unwrap();
    let temp_dev = fs::metadata(temp.path()).unwrap().dev();
    let spool_dev = fs::metadata(spool.path()).unwrap().dev();
    if temp_dev == spool_dev {
        return;
    }

    let when = chrono::DateTime::parse_from_rfc3339("2031-01-01T06:30:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let callfile = CallFile::new(
        Call::new("SIP/flowroute/18002223333").unwrap(),
        Application::new("Playback", "hello-world").unwrap(),
    )
    .with_spool_dir(spool.path())
    .with_temp_dir(temp.path())
    .with_filename("cross.call");
    let expected = callfile.contents().unwrap();

    let receipt = callfile.spool(Some(when)).unwrap();

    assert_eq!(receipt.spool_path, spool.path().join("cross.call"));
    assert_eq!(fs::read_to_string(&receipt.spool_path).unwrap(), expected);
    assert!(!temp.path().join("cross.call").exists());
    let entries: Vec<_> = fs::read_dir(spool.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["cross.call".to_string()]);
    assert_eq!(
        fs::metadata(&receipt.spool_path).unwrap().mtime(),
        when.timestamp()
    );
}
