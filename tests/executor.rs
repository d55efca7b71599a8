// ABOUTME: Integration tests for the create-env executor.
// ABOUTME: Covers artifact checks, generated scripts, script execution and version parsing.

mod support;

use bbl::bosh::{
    CreateEnvInput, DeleteEnvInput, Executor, InterpolateInput, Role, STATE_DIR_VAR,
    required_artifacts,
};
use bbl::types::Iaas;
use std::fs;
use support::{FakeBosh, init_tracing, write_script};
use tempfile::TempDir;

fn executor() -> Executor<FakeBosh> {
    Executor::new(FakeBosh::new("/fake/bosh"))
}

fn touch_all(paths: &[std::path::PathBuf]) {
    for path in paths {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }
}

mod initialized {
    use super::*;

    fn check(role: Role, iaas: Iaas) {
        let dir = TempDir::new().unwrap();
        let input = InterpolateInput::new(dir.path(), iaas.clone());
        let executor = executor();
        let is_initialized = |input: &InterpolateInput| match role {
            Role::Jumpbox => executor.is_jumpbox_initialized(input),
            Role::Director => executor.is_director_initialized(input),
        };

        let artifacts = required_artifacts(role, &input);
        assert!(!is_initialized(&input), "{role} on {iaas}: empty dir");

        touch_all(&artifacts);
        assert!(is_initialized(&input), "{role} on {iaas}: all present");

        for artifact in &artifacts {
            fs::remove_file(artifact).unwrap();
            assert!(
                !is_initialized(&input),
                "{role} on {iaas}: {} missing",
                artifact.display()
            );
            fs::write(artifact, "").unwrap();
        }
    }

    #[test]
    fn jumpbox_on_every_iaas() {
        for iaas in Iaas::SUPPORTED {
            check(Role::Jumpbox, iaas);
        }
    }

    #[test]
    fn director_on_every_iaas() {
        for iaas in Iaas::SUPPORTED {
            check(Role::Director, iaas);
        }
    }

    #[test]
    fn unknown_iaas_needs_only_the_common_set() {
        check(Role::Director, Iaas::from("vsphere"));

        let input = InterpolateInput::new("/state", Iaas::from("vsphere"));
        let names: Vec<_> = required_artifacts(Role::Director, &input)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "bosh.yml",
                "cpi.yml",
                "jumpbox-user.yml",
                "uaa.yml",
                "credhub.yml",
                "create-director.sh",
                "delete-director.sh"
            ]
        );
    }

    #[test]
    fn aws_director_needs_its_overlays() {
        let input = InterpolateInput::new("/state", Iaas::Aws);
        let paths = required_artifacts(Role::Director, &input);
        for name in [
            "aws-bosh-director-ephemeral-ip-ops.yml",
            "iam-instance-profile.yml",
            "aws-bosh-director-encrypt-disk-ops.yml",
        ] {
            assert!(
                paths.contains(&std::path::PathBuf::from("/state/deployment").join(name)),
                "{name}"
            );
        }
    }
}

mod scripts {
    use super::*;

    #[test]
    fn jumpbox_scripts_on_azure() {
        let dir = TempDir::new().unwrap();
        let input = InterpolateInput::new(dir.path(), Iaas::Azure);

        executor().jumpbox_create_env_args(&input).unwrap();

        let expected = |action: &str| {
            format!(
                "#!/bin/sh\n\
                 /fake/bosh {action} \\\n  \
                 ${{BBL_STATE_DIR}}/deployment/jumpbox.yml \\\n  \
                 --state ${{BBL_STATE_DIR}}/vars/jumpbox-state.json \\\n  \
                 --vars-store ${{BBL_STATE_DIR}}/vars/jumpbox-variables.yml \\\n  \
                 --vars-file ${{BBL_STATE_DIR}}/vars/jumpbox-deployment-vars.yml \\\n  \
                 -o ${{BBL_STATE_DIR}}/deployment/cpi.yml\n"
            )
        };
        assert_eq!(
            fs::read_to_string(dir.path().join("create-jumpbox.sh")).unwrap(),
            expected("create-env")
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("delete-jumpbox.sh")).unwrap(),
            expected("delete-env")
        );
    }

    #[test]
    fn director_scripts_on_aws_apply_user_ops_last() {
        let dir = TempDir::new().unwrap();
        let mut input = InterpolateInput::new(dir.path(), Iaas::Aws);
        input.ops_file = "some-ops-file".to_string();

        executor().director_create_env_args(&input).unwrap();

        let expected = |action: &str| {
            format!(
                "#!/bin/sh\n\
                 /fake/bosh {action} \\\n  \
                 ${{BBL_STATE_DIR}}/deployment/bosh.yml \\\n  \
                 --state ${{BBL_STATE_DIR}}/vars/bosh-state.json \\\n  \
                 --vars-store ${{BBL_STATE_DIR}}/vars/director-variables.yml \\\n  \
                 --vars-file ${{BBL_STATE_DIR}}/vars/director-deployment-vars.yml \\\n  \
                 -o ${{BBL_STATE_DIR}}/deployment/cpi.yml \\\n  \
                 -o ${{BBL_STATE_DIR}}/deployment/jumpbox-user.yml \\\n  \
                 -o ${{BBL_STATE_DIR}}/deployment/uaa.yml \\\n  \
                 -o ${{BBL_STATE_DIR}}/deployment/credhub.yml \\\n  \
                 -o ${{BBL_STATE_DIR}}/deployment/aws-bosh-director-ephemeral-ip-ops.yml \\\n  \
                 -o ${{BBL_STATE_DIR}}/deployment/iam-instance-profile.yml \\\n  \
                 -o ${{BBL_STATE_DIR}}/deployment/aws-bosh-director-encrypt-disk-ops.yml \\\n  \
                 -o ${{BBL_STATE_DIR}}/vars/user-ops-file.yml\n"
            )
        };
        assert_eq!(
            fs::read_to_string(dir.path().join("create-director.sh")).unwrap(),
            expected("create-env")
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("delete-director.sh")).unwrap(),
            expected("delete-env")
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("vars").join("user-ops-file.yml")).unwrap(),
            "some-ops-file"
        );
    }

    #[test]
    fn previous_state_and_variables_are_written_back() {
        let dir = TempDir::new().unwrap();
        let mut input = InterpolateInput::new(dir.path(), Iaas::Gcp);
        input
            .bosh_state
            .insert("some-key".to_string(), "some-value".into());
        input.variables = "some-var: some-value\n".to_string();

        executor().jumpbox_create_env_args(&input).unwrap();

        let vars = dir.path().join("vars");
        assert_eq!(
            fs::read_to_string(vars.join("jumpbox-state.json")).unwrap(),
            r#"{"some-key":"some-value"}"#
        );
        assert_eq!(
            fs::read_to_string(vars.join("jumpbox-variables.yml")).unwrap(),
            "some-var: some-value\n"
        );
    }

    #[test]
    fn scripts_are_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let input = InterpolateInput::new(dir.path(), Iaas::Gcp);
        executor().jumpbox_create_env_args(&input).unwrap();

        let mode = fs::metadata(dir.path().join("create-jumpbox.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    fn unwritable_state_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let not_a_dir = dir.path().join("state");
        fs::write(&not_a_dir, "").unwrap();
        let input = InterpolateInput::new(&not_a_dir, Iaas::Gcp);

        let err = executor().jumpbox_create_env_args(&input).unwrap_err();
        assert!(err.to_string().contains("create directory"), "{err}");
    }
}

mod run {
    use super::*;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(script_name: &str, body: &str) -> Self {
            init_tracing();
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("vars")).unwrap();
            write_script(&dir.path().join(script_name), body);
            Self { dir }
        }

        fn create_input(&self) -> CreateEnvInput {
            CreateEnvInput {
                deployment: "director".to_string(),
                deployment_vars: "some-deployment-vars".to_string(),
                vars_dir: self.dir.path().join("vars"),
                state_dir: self.dir.path().to_path_buf(),
            }
        }

        fn delete_input(&self) -> DeleteEnvInput {
            DeleteEnvInput {
                deployment: "director".to_string(),
                deployment_vars: "some-deployment-vars".to_string(),
                vars_dir: self.dir.path().join("vars"),
                state_dir: self.dir.path().to_path_buf(),
            }
        }
    }

    #[tokio::test]
    async fn create_env_returns_the_vars_store() {
        let fixture = Fixture::new(
            "create-director.sh",
            "#!/bin/sh\necho 'some-vars-store' > \"$BBL_STATE_DIR/vars/director-variables.yml\"\n",
        );

        let vars_store = executor()
            .create_env(&fixture.create_input())
            .await
            .unwrap();

        assert_eq!(vars_store, "some-vars-store\n");
        assert_eq!(
            fs::read_to_string(
                fixture
                    .dir
                    .path()
                    .join("vars")
                    .join("director-deployment-vars.yml")
            )
            .unwrap(),
            "some-deployment-vars"
        );
    }

    #[tokio::test]
    async fn create_env_scopes_state_dir_to_the_script() {
        let fixture = Fixture::new(
            "create-director.sh",
            "#!/bin/sh\nprintf '%s' \"$BBL_STATE_DIR\" > seen\ntouch vars/director-variables.yml\n",
        );

        executor()
            .create_env(&fixture.create_input())
            .await
            .unwrap();

        let seen = fs::read_to_string(fixture.dir.path().join("seen")).unwrap();
        assert_eq!(seen, fixture.dir.path().display().to_string());
        assert!(std::env::var_os(STATE_DIR_VAR).is_none());
    }

    #[tokio::test]
    async fn create_env_failure_reports_exit_status() {
        let fixture = Fixture::new("create-director.sh", "#!/bin/sh\nexit 1\n");

        let err = executor()
            .create_env(&fixture.create_input())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Run bosh create-env: exit status 1");
        assert!(std::env::var_os(STATE_DIR_VAR).is_none());
    }

    #[tokio::test]
    async fn delete_env_runs_the_delete_script() {
        let fixture = Fixture::new("delete-director.sh", "#!/bin/sh\ntouch deleted\n");

        executor()
            .delete_env(&fixture.delete_input())
            .await
            .unwrap();

        assert!(fixture.dir.path().join("deleted").exists());
        assert_eq!(
            fs::read_to_string(
                fixture
                    .dir
                    .path()
                    .join("vars")
                    .join("director-deployment-vars.yml")
            )
            .unwrap(),
            "some-deployment-vars"
        );
    }

    #[tokio::test]
    async fn delete_env_failure_reports_exit_status() {
        let fixture = Fixture::new("delete-director.sh", "#!/bin/sh\nexit 1\n");

        let err = executor()
            .delete_env(&fixture.delete_input())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Run bosh delete-env: exit status 1");
    }

    #[tokio::test]
    async fn missing_script_is_a_run_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("vars")).unwrap();
        let input = CreateEnvInput {
            deployment: "jumpbox".to_string(),
            deployment_vars: String::new(),
            vars_dir: dir.path().join("vars"),
            state_dir: dir.path().to_path_buf(),
        };

        let err = executor().create_env(&input).await.unwrap_err();
        assert!(err.to_string().starts_with("Run bosh create-env: "), "{err}");
    }
}

mod version {
    use super::*;

    #[tokio::test]
    async fn extracts_the_semver() {
        let executor = Executor::new(
            FakeBosh::new("/fake/bosh").with_stdout("some-text version 2.0.24 some-other-text"),
        );
        assert_eq!(executor.version().await.unwrap(), "2.0.24");
    }

    #[tokio::test]
    async fn runs_bosh_with_only_the_version_flag() {
        let bosh = FakeBosh::new("/fake/bosh").with_stdout("version 2.0.48");
        let executor = Executor::new(bosh.clone());

        executor.version().await.unwrap();

        assert_eq!(bosh.calls(), [(None, vec!["-v".to_string()])]);
    }

    #[tokio::test]
    async fn empty_output_is_unparsable() {
        let executor = Executor::new(FakeBosh::new("/fake/bosh"));
        let err = executor.version().await.unwrap_err();
        assert!(err.is_version_unparsable());
        assert_eq!(err.to_string(), "BOSH version could not be parsed");
    }

    #[tokio::test]
    async fn unrelated_output_is_unparsable() {
        let executor =
            Executor::new(FakeBosh::new("/fake/bosh").with_stdout("version two point oh"));
        assert!(executor.version().await.unwrap_err().is_version_unparsable());
    }

    #[tokio::test]
    async fn command_failure_is_not_a_parse_error() {
        let executor = Executor::new(FakeBosh::new("/fake/bosh").failing("bosh exploded"));
        let err = executor.version().await.unwrap_err();
        assert!(!err.is_version_unparsable());
        assert!(err.to_string().contains("bosh exploded"));
    }
}
