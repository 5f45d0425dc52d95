//! Conversions between ECS SDK types and the JSON wire shape the core
//! handlers read and edit.
//!
//! Field names follow the ECS API. Absent optional attributes and empty
//! lists are left out; timestamps become epoch seconds.

use std::collections::HashMap;
use std::fmt::Display;

use aws_sdk_ecs::primitives::DateTime;
use aws_sdk_ecs::types::{
    ApplicationProtocol, AssignPublicIp, AwsVpcConfiguration, Container, ContainerCondition,
    ContainerDefinition, ContainerDependency, ContainerRestartPolicy, Device,
    DeviceCgroupPermission, EnvironmentFile, EnvironmentFileType, Failure, FirelensConfiguration,
    FirelensConfigurationType, HealthCheck, HostEntry, KernelCapabilities, KeyValuePair,
    LinuxParameters, LogConfiguration, LogDriver, MountPoint, NetworkConfiguration, PortMapping,
    RepositoryCredentials, ResourceRequirement, ResourceType, Secret, Service, SystemControl,
    Task, TaskDefinition, Tmpfs, TransportProtocol, Ulimit, UlimitName, VersionConsistency,
    VolumeFrom,
};
use ecs_manager_core::{Fault, Payload};
use serde_json::{json, Value};

pub fn service_to_json(service: &Service) -> Value {
    let mut map = Payload::new();
    put(&mut map, "serviceArn", service.service_arn());
    put(&mut map, "serviceName", service.service_name());
    put(&mut map, "clusterArn", service.cluster_arn());
    put(&mut map, "status", service.status());
    put(&mut map, "desiredCount", Some(service.desired_count()));
    put(&mut map, "runningCount", Some(service.running_count()));
    put(&mut map, "pendingCount", Some(service.pending_count()));
    put(
        &mut map,
        "launchType",
        service.launch_type().map(|launch_type| launch_type.as_str()),
    );
    put(&mut map, "taskDefinition", service.task_definition());
    if let Some(network) = service.network_configuration() {
        map.insert(
            "networkConfiguration".to_string(),
            network_configuration_to_json(network),
        );
    }
    Value::Object(map)
}

pub fn network_configuration_to_json(network: &NetworkConfiguration) -> Value {
    let mut map = Payload::new();
    if let Some(vpc) = network.awsvpc_configuration() {
        let mut vpc_map = Payload::new();
        put_strings(&mut vpc_map, "subnets", vpc.subnets());
        put_strings(&mut vpc_map, "securityGroups", vpc.security_groups());
        put(
            &mut vpc_map,
            "assignPublicIp",
            vpc.assign_public_ip().map(|assign| assign.as_str()),
        );
        map.insert("awsvpcConfiguration".to_string(), Value::Object(vpc_map));
    }
    Value::Object(map)
}

pub fn network_configuration_from_json(value: &Value) -> Result<NetworkConfiguration, Fault> {
    let network = as_object(value, "networkConfiguration")?;
    let awsvpc = match network.get("awsvpcConfiguration") {
        Some(vpc) => {
            let vpc = as_object(vpc, "awsvpcConfiguration")?;
            Some(
                AwsVpcConfiguration::builder()
                    .set_subnets(strings(vpc, "subnets"))
                    .set_security_groups(strings(vpc, "securityGroups"))
                    .set_assign_public_ip(variant::<AssignPublicIp>(vpc, "assignPublicIp"))
                    .build()
                    .map_err(invalid)?,
            )
        }
        None => None,
    };
    Ok(NetworkConfiguration::builder()
        .set_awsvpc_configuration(awsvpc)
        .build())
}

pub fn task_definition_to_json(task_definition: &TaskDefinition) -> Value {
    let mut map = Payload::new();
    put(&mut map, "taskDefinitionArn", task_definition.task_definition_arn());
    put(&mut map, "family", task_definition.family());
    put(&mut map, "revision", Some(task_definition.revision()));
    put(
        &mut map,
        "status",
        task_definition.status().map(|status| status.as_str()),
    );
    map.insert(
        "containerDefinitions".to_string(),
        Value::Array(
            task_definition
                .container_definitions()
                .iter()
                .map(container_definition_to_json)
                .collect(),
        ),
    );
    put(&mut map, "executionRoleArn", task_definition.execution_role_arn());
    put(&mut map, "taskRoleArn", task_definition.task_role_arn());
    put(
        &mut map,
        "networkMode",
        task_definition.network_mode().map(|mode| mode.as_str()),
    );
    put(&mut map, "cpu", task_definition.cpu());
    put(&mut map, "memory", task_definition.memory());
    let compatibilities: Vec<String> = task_definition
        .requires_compatibilities()
        .iter()
        .map(|compatibility| compatibility.as_str().to_string())
        .collect();
    put_strings(&mut map, "requiresCompatibilities", &compatibilities);
    Value::Object(map)
}

pub fn container_definition_to_json(container: &ContainerDefinition) -> Value {
    let mut map = Payload::new();
    put(&mut map, "name", container.name());
    put(&mut map, "image", container.image());
    if let Some(credentials) = container.repository_credentials() {
        map.insert(
            "repositoryCredentials".to_string(),
            json!({"credentialsParameter": credentials.credentials_parameter()}),
        );
    }
    if container.cpu() != 0 {
        put(&mut map, "cpu", Some(container.cpu()));
    }
    put(&mut map, "memory", container.memory());
    put(&mut map, "memoryReservation", container.memory_reservation());
    put_strings(&mut map, "links", container.links());
    put_list(&mut map, "portMappings", container.port_mappings(), |mapping| {
        let mut entry = Payload::new();
        put(&mut entry, "name", mapping.name());
        put(&mut entry, "containerPort", mapping.container_port());
        put(&mut entry, "hostPort", mapping.host_port());
        put(&mut entry, "protocol", mapping.protocol().map(|protocol| protocol.as_str()));
        put(&mut entry, "appProtocol", mapping.app_protocol().map(|protocol| protocol.as_str()));
        put(&mut entry, "containerPortRange", mapping.container_port_range());
        Value::Object(entry)
    });
    put(&mut map, "essential", container.essential());
    if let Some(policy) = container.restart_policy() {
        let mut entry = Payload::new();
        put(&mut entry, "enabled", Some(policy.enabled()));
        put_list(&mut entry, "ignoredExitCodes", policy.ignored_exit_codes(), |code| {
            Value::from(*code)
        });
        put(&mut entry, "restartAttemptPeriod", policy.restart_attempt_period());
        map.insert("restartPolicy".to_string(), Value::Object(entry));
    }
    put_strings(&mut map, "entryPoint", container.entry_point());
    put_strings(&mut map, "command", container.command());
    put_list(&mut map, "environment", container.environment(), |pair| {
        let mut entry = Payload::new();
        put(&mut entry, "name", pair.name());
        put(&mut entry, "value", pair.value());
        Value::Object(entry)
    });
    put_list(&mut map, "environmentFiles", container.environment_files(), |file| {
        json!({"value": file.value(), "type": file.r#type().as_str()})
    });
    put_list(&mut map, "mountPoints", container.mount_points(), |mount| {
        let mut entry = Payload::new();
        put(&mut entry, "sourceVolume", mount.source_volume());
        put(&mut entry, "containerPath", mount.container_path());
        put(&mut entry, "readOnly", mount.read_only());
        Value::Object(entry)
    });
    put_list(&mut map, "volumesFrom", container.volumes_from(), |volume| {
        let mut entry = Payload::new();
        put(&mut entry, "sourceContainer", volume.source_container());
        put(&mut entry, "readOnly", volume.read_only());
        Value::Object(entry)
    });
    if let Some(linux) = container.linux_parameters() {
        map.insert("linuxParameters".to_string(), linux_parameters_to_json(linux));
    }
    put_list(&mut map, "secrets", container.secrets(), secret_to_json);
    put_list(&mut map, "dependsOn", container.depends_on(), |dependency| {
        json!({
            "containerName": dependency.container_name(),
            "condition": dependency.condition().as_str(),
        })
    });
    put(&mut map, "startTimeout", container.start_timeout());
    put(&mut map, "stopTimeout", container.stop_timeout());
    put(
        &mut map,
        "versionConsistency",
        container.version_consistency().map(|consistency| consistency.as_str()),
    );
    put(&mut map, "hostname", container.hostname());
    put(&mut map, "user", container.user());
    put(&mut map, "workingDirectory", container.working_directory());
    put(&mut map, "disableNetworking", container.disable_networking());
    put(&mut map, "privileged", container.privileged());
    put(
        &mut map,
        "readonlyRootFilesystem",
        container.readonly_root_filesystem(),
    );
    put_strings(&mut map, "dnsServers", container.dns_servers());
    put_strings(&mut map, "dnsSearchDomains", container.dns_search_domains());
    put_list(&mut map, "extraHosts", container.extra_hosts(), |host| {
        json!({"hostname": host.hostname(), "ipAddress": host.ip_address()})
    });
    put_strings(
        &mut map,
        "dockerSecurityOptions",
        container.docker_security_options(),
    );
    put(&mut map, "interactive", container.interactive());
    put(&mut map, "pseudoTerminal", container.pseudo_terminal());
    if let Some(labels) = container.docker_labels() {
        map.insert("dockerLabels".to_string(), string_map_to_json(labels));
    }
    put_list(&mut map, "ulimits", container.ulimits(), |ulimit| {
        json!({
            "name": ulimit.name().as_str(),
            "softLimit": ulimit.soft_limit(),
            "hardLimit": ulimit.hard_limit(),
        })
    });
    if let Some(log_configuration) = container.log_configuration() {
        let mut entry = Payload::new();
        put(
            &mut entry,
            "logDriver",
            Some(log_configuration.log_driver().as_str()),
        );
        if let Some(options) = log_configuration.options() {
            entry.insert("options".to_string(), string_map_to_json(options));
        }
        put_list(
            &mut entry,
            "secretOptions",
            log_configuration.secret_options(),
            secret_to_json,
        );
        map.insert("logConfiguration".to_string(), Value::Object(entry));
    }
    if let Some(health_check) = container.health_check() {
        let mut entry = Payload::new();
        put_strings(&mut entry, "command", health_check.command());
        put(&mut entry, "interval", health_check.interval());
        put(&mut entry, "timeout", health_check.timeout());
        put(&mut entry, "retries", health_check.retries());
        put(&mut entry, "startPeriod", health_check.start_period());
        map.insert("healthCheck".to_string(), Value::Object(entry));
    }
    put_list(&mut map, "systemControls", container.system_controls(), |control| {
        let mut entry = Payload::new();
        put(&mut entry, "namespace", control.namespace());
        put(&mut entry, "value", control.value());
        Value::Object(entry)
    });
    put_list(
        &mut map,
        "resourceRequirements",
        container.resource_requirements(),
        |requirement| json!({"value": requirement.value(), "type": requirement.r#type().as_str()}),
    );
    if let Some(firelens) = container.firelens_configuration() {
        let mut entry = Payload::new();
        put(&mut entry, "type", Some(firelens.r#type().as_str()));
        if let Some(options) = firelens.options() {
            entry.insert("options".to_string(), string_map_to_json(options));
        }
        map.insert("firelensConfiguration".to_string(), Value::Object(entry));
    }
    put_strings(&mut map, "credentialSpecs", container.credential_specs());
    Value::Object(map)
}

fn linux_parameters_to_json(linux: &LinuxParameters) -> Value {
    let mut map = Payload::new();
    if let Some(capabilities) = linux.capabilities() {
        let mut entry = Payload::new();
        put_strings(&mut entry, "add", capabilities.add());
        put_strings(&mut entry, "drop", capabilities.drop());
        map.insert("capabilities".to_string(), Value::Object(entry));
    }
    put_list(&mut map, "devices", linux.devices(), |device| {
        let mut entry = Payload::new();
        put(&mut entry, "hostPath", Some(device.host_path()));
        put(&mut entry, "containerPath", device.container_path());
        let permissions: Vec<String> = device
            .permissions()
            .iter()
            .map(|permission| permission.as_str().to_string())
            .collect();
        put_strings(&mut entry, "permissions", &permissions);
        Value::Object(entry)
    });
    put(&mut map, "initProcessEnabled", linux.init_process_enabled());
    put(&mut map, "sharedMemorySize", linux.shared_memory_size());
    put_list(&mut map, "tmpfs", linux.tmpfs(), |tmpfs| {
        let mut entry = Payload::new();
        put(&mut entry, "containerPath", Some(tmpfs.container_path()));
        put(&mut entry, "size", Some(tmpfs.size()));
        put_strings(&mut entry, "mountOptions", tmpfs.mount_options());
        Value::Object(entry)
    });
    put(&mut map, "maxSwap", linux.max_swap());
    put(&mut map, "swappiness", linux.swappiness());
    Value::Object(map)
}

pub fn container_definition_from_json(value: &Value) -> Result<ContainerDefinition, Fault> {
    let container = as_object(value, "containerDefinitions")?;

    let repository_credentials = nested(container, "repositoryCredentials", |entry| {
        RepositoryCredentials::builder()
            .set_credentials_parameter(text(entry, "credentialsParameter"))
            .build()
            .map_err(invalid)
    })?;
    let port_mappings = objects(container, "portMappings", |mapping| {
        Ok(PortMapping::builder()
            .set_name(text(mapping, "name"))
            .set_container_port(int(mapping, "containerPort"))
            .set_host_port(int(mapping, "hostPort"))
            .set_protocol(variant::<TransportProtocol>(mapping, "protocol"))
            .set_app_protocol(variant::<ApplicationProtocol>(mapping, "appProtocol"))
            .set_container_port_range(text(mapping, "containerPortRange"))
            .build())
    })?;
    let restart_policy = nested(container, "restartPolicy", |entry| {
        ContainerRestartPolicy::builder()
            .set_enabled(flag(entry, "enabled"))
            .set_ignored_exit_codes(ints(entry, "ignoredExitCodes"))
            .set_restart_attempt_period(int(entry, "restartAttemptPeriod"))
            .build()
            .map_err(invalid)
    })?;
    let environment = objects(container, "environment", |pair| {
        Ok(KeyValuePair::builder()
            .set_name(text(pair, "name"))
            .set_value(text(pair, "value"))
            .build())
    })?;
    let environment_files = objects(container, "environmentFiles", |file| {
        EnvironmentFile::builder()
            .set_value(text(file, "value"))
            .set_type(variant::<EnvironmentFileType>(file, "type"))
            .build()
            .map_err(invalid)
    })?;
    let mount_points = objects(container, "mountPoints", |mount| {
        Ok(MountPoint::builder()
            .set_source_volume(text(mount, "sourceVolume"))
            .set_container_path(text(mount, "containerPath"))
            .set_read_only(flag(mount, "readOnly"))
            .build())
    })?;
    let volumes_from = objects(container, "volumesFrom", |volume| {
        Ok(VolumeFrom::builder()
            .set_source_container(text(volume, "sourceContainer"))
            .set_read_only(flag(volume, "readOnly"))
            .build())
    })?;
    let linux_parameters = nested(container, "linuxParameters", linux_parameters_from_json)?;
    let secrets = objects(container, "secrets", secret_from_json)?;
    let depends_on = objects(container, "dependsOn", |dependency| {
        ContainerDependency::builder()
            .set_container_name(text(dependency, "containerName"))
            .set_condition(variant::<ContainerCondition>(dependency, "condition"))
            .build()
            .map_err(invalid)
    })?;
    let extra_hosts = objects(container, "extraHosts", |host| {
        HostEntry::builder()
            .set_hostname(text(host, "hostname"))
            .set_ip_address(text(host, "ipAddress"))
            .build()
            .map_err(invalid)
    })?;
    let ulimits = objects(container, "ulimits", |ulimit| {
        Ulimit::builder()
            .set_name(variant::<UlimitName>(ulimit, "name"))
            .set_soft_limit(int(ulimit, "softLimit"))
            .set_hard_limit(int(ulimit, "hardLimit"))
            .build()
            .map_err(invalid)
    })?;
    let log_configuration = nested(container, "logConfiguration", |entry| {
        LogConfiguration::builder()
            .set_log_driver(variant::<LogDriver>(entry, "logDriver"))
            .set_options(string_map(entry, "options"))
            .set_secret_options(objects(entry, "secretOptions", secret_from_json)?)
            .build()
            .map_err(invalid)
    })?;
    let health_check = nested(container, "healthCheck", |entry| {
        HealthCheck::builder()
            .set_command(strings(entry, "command"))
            .set_interval(int(entry, "interval"))
            .set_timeout(int(entry, "timeout"))
            .set_retries(int(entry, "retries"))
            .set_start_period(int(entry, "startPeriod"))
            .build()
            .map_err(invalid)
    })?;
    let system_controls = objects(container, "systemControls", |control| {
        Ok(SystemControl::builder()
            .set_namespace(text(control, "namespace"))
            .set_value(text(control, "value"))
            .build())
    })?;
    let resource_requirements = objects(container, "resourceRequirements", |requirement| {
        ResourceRequirement::builder()
            .set_value(text(requirement, "value"))
            .set_type(variant::<ResourceType>(requirement, "type"))
            .build()
            .map_err(invalid)
    })?;
    let firelens_configuration = nested(container, "firelensConfiguration", |entry| {
        FirelensConfiguration::builder()
            .set_type(variant::<FirelensConfigurationType>(entry, "type"))
            .set_options(string_map(entry, "options"))
            .build()
            .map_err(invalid)
    })?;

    Ok(ContainerDefinition::builder()
        .set_name(text(container, "name"))
        .set_image(text(container, "image"))
        .set_repository_credentials(repository_credentials)
        .set_cpu(int(container, "cpu"))
        .set_memory(int(container, "memory"))
        .set_memory_reservation(int(container, "memoryReservation"))
        .set_links(strings(container, "links"))
        .set_port_mappings(port_mappings)
        .set_essential(flag(container, "essential"))
        .set_restart_policy(restart_policy)
        .set_entry_point(strings(container, "entryPoint"))
        .set_command(strings(container, "command"))
        .set_environment(environment)
        .set_environment_files(environment_files)
        .set_mount_points(mount_points)
        .set_volumes_from(volumes_from)
        .set_linux_parameters(linux_parameters)
        .set_secrets(secrets)
        .set_depends_on(depends_on)
        .set_start_timeout(int(container, "startTimeout"))
        .set_stop_timeout(int(container, "stopTimeout"))
        .set_version_consistency(variant::<VersionConsistency>(container, "versionConsistency"))
        .set_hostname(text(container, "hostname"))
        .set_user(text(container, "user"))
        .set_working_directory(text(container, "workingDirectory"))
        .set_disable_networking(flag(container, "disableNetworking"))
        .set_privileged(flag(container, "privileged"))
        .set_readonly_root_filesystem(flag(container, "readonlyRootFilesystem"))
        .set_dns_servers(strings(container, "dnsServers"))
        .set_dns_search_domains(strings(container, "dnsSearchDomains"))
        .set_extra_hosts(extra_hosts)
        .set_docker_security_options(strings(container, "dockerSecurityOptions"))
        .set_interactive(flag(container, "interactive"))
        .set_pseudo_terminal(flag(container, "pseudoTerminal"))
        .set_docker_labels(string_map(container, "dockerLabels"))
        .set_ulimits(ulimits)
        .set_log_configuration(log_configuration)
        .set_health_check(health_check)
        .set_system_controls(system_controls)
        .set_resource_requirements(resource_requirements)
        .set_firelens_configuration(firelens_configuration)
        .set_credential_specs(strings(container, "credentialSpecs"))
        .build())
}

fn linux_parameters_from_json(linux: &Payload) -> Result<LinuxParameters, Fault> {
    let capabilities = nested(linux, "capabilities", |entry| {
        Ok(KernelCapabilities::builder()
            .set_add(strings(entry, "add"))
            .set_drop(strings(entry, "drop"))
            .build())
    })?;
    let devices = objects(linux, "devices", |device| {
        Device::builder()
            .set_host_path(text(device, "hostPath"))
            .set_container_path(text(device, "containerPath"))
            .set_permissions(strings(device, "permissions").map(|permissions| {
                permissions
                    .iter()
                    .map(|permission| DeviceCgroupPermission::from(permission.as_str()))
                    .collect()
            }))
            .build()
            .map_err(invalid)
    })?;
    let tmpfs = objects(linux, "tmpfs", |tmpfs| {
        Tmpfs::builder()
            .set_container_path(text(tmpfs, "containerPath"))
            .set_size(int(tmpfs, "size"))
            .set_mount_options(strings(tmpfs, "mountOptions"))
            .build()
            .map_err(invalid)
    })?;
    Ok(LinuxParameters::builder()
        .set_capabilities(capabilities)
        .set_devices(devices)
        .set_init_process_enabled(flag(linux, "initProcessEnabled"))
        .set_shared_memory_size(int(linux, "sharedMemorySize"))
        .set_tmpfs(tmpfs)
        .set_max_swap(int(linux, "maxSwap"))
        .set_swappiness(int(linux, "swappiness"))
        .build())
}

pub fn task_to_json(task: &Task) -> Value {
    let mut map = Payload::new();
    put(&mut map, "taskArn", task.task_arn());
    put(&mut map, "taskDefinitionArn", task.task_definition_arn());
    put(&mut map, "clusterArn", task.cluster_arn());
    put(&mut map, "group", task.group());
    put(
        &mut map,
        "connectivity",
        task.connectivity().map(|connectivity| connectivity.as_str()),
    );
    put(
        &mut map,
        "healthStatus",
        task.health_status().map(|status| status.as_str()),
    );
    put(&mut map, "desiredStatus", task.desired_status());
    put(&mut map, "lastStatus", task.last_status());
    put(&mut map, "startedBy", task.started_by());
    put(&mut map, "startedAt", task.started_at().map(epoch_seconds));
    put(&mut map, "stoppedAt", task.stopped_at().map(epoch_seconds));
    put(
        &mut map,
        "executionStoppedAt",
        task.execution_stopped_at().map(epoch_seconds),
    );
    put(&mut map, "stopCode", task.stop_code().map(|code| code.as_str()));
    put(&mut map, "stoppedReason", task.stopped_reason());
    map.insert(
        "containers".to_string(),
        Value::Array(task.containers().iter().map(container_to_json).collect()),
    );
    Value::Object(map)
}

pub fn container_to_json(container: &Container) -> Value {
    let mut map = Payload::new();
    put(&mut map, "containerArn", container.container_arn());
    put(&mut map, "taskArn", container.task_arn());
    put(&mut map, "name", container.name());
    put(&mut map, "image", container.image());
    put(&mut map, "lastStatus", container.last_status());
    put(&mut map, "exitCode", container.exit_code());
    put(&mut map, "reason", container.reason());
    put(
        &mut map,
        "healthStatus",
        container.health_status().map(|status| status.as_str()),
    );
    Value::Object(map)
}

pub fn failures_to_json(failures: &[Failure]) -> Value {
    Value::Array(
        failures
            .iter()
            .map(|failure| {
                let mut map = Payload::new();
                put(&mut map, "arn", failure.arn());
                put(&mut map, "reason", failure.reason());
                put(&mut map, "detail", failure.detail());
                Value::Object(map)
            })
            .collect(),
    )
}

fn secret_to_json(secret: &Secret) -> Value {
    let mut map = Payload::new();
    put(&mut map, "name", Some(secret.name()));
    put(&mut map, "valueFrom", Some(secret.value_from()));
    Value::Object(map)
}

fn secret_from_json(secret: &Payload) -> Result<Secret, Fault> {
    Secret::builder()
        .set_name(text(secret, "name"))
        .set_value_from(text(secret, "valueFrom"))
        .build()
        .map_err(invalid)
}

fn epoch_seconds(timestamp: &DateTime) -> f64 {
    timestamp.as_secs_f64()
}

fn string_map_to_json(map: &HashMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
            .collect(),
    )
}

fn put<V: Into<Value>>(map: &mut Payload, key: &str, value: Option<V>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

fn put_strings(map: &mut Payload, key: &str, values: &[String]) {
    if !values.is_empty() {
        map.insert(
            key.to_string(),
            Value::Array(values.iter().map(|value| Value::from(value.as_str())).collect()),
        );
    }
}

fn put_list<T>(map: &mut Payload, key: &str, items: &[T], convert: impl Fn(&T) -> Value) {
    if !items.is_empty() {
        map.insert(
            key.to_string(),
            Value::Array(items.iter().map(convert).collect()),
        );
    }
}

fn invalid(error: impl Display) -> Fault {
    Fault::type_mismatch(format!("invalid task definition attribute: {error}"))
}

fn as_object<'a>(value: &'a Value, key: &str) -> Result<&'a Payload, Fault> {
    value
        .as_object()
        .ok_or_else(|| Fault::type_mismatch(format!("'{key}' entries must be mappings")))
}

fn text(map: &Payload, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn int(map: &Payload, key: &str) -> Option<i32> {
    map.get(key)
        .and_then(Value::as_i64)
        .and_then(|number| i32::try_from(number).ok())
}

fn ints(map: &Payload, key: &str) -> Option<Vec<i32>> {
    map.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_i64)
            .filter_map(|number| i32::try_from(number).ok())
            .collect()
    })
}

/// Reads an SDK enum from its wire string. Unrecognised values are kept as-is.
fn variant<T: for<'a> From<&'a str>>(map: &Payload, key: &str) -> Option<T> {
    map.get(key).and_then(Value::as_str).map(T::from)
}

fn flag(map: &Payload, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

fn strings(map: &Payload, key: &str) -> Option<Vec<String>> {
    map.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

fn string_map(map: &Payload, key: &str) -> Option<HashMap<String, String>> {
    map.get(key).and_then(Value::as_object).map(|entries| {
        entries
            .iter()
            .filter_map(|(name, value)| {
                value.as_str().map(|value| (name.clone(), value.to_string()))
            })
            .collect()
    })
}

/// Converts a list of mappings, keeping an absent list absent.
fn objects<T>(
    map: &Payload,
    key: &str,
    convert: impl Fn(&Payload) -> Result<T, Fault>,
) -> Result<Option<Vec<T>>, Fault> {
    let Some(items) = map.get(key).and_then(Value::as_array) else {
        return Ok(None);
    };
    items
        .iter()
        .map(|item| as_object(item, key).and_then(&convert))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn nested<T>(
    map: &Payload,
    key: &str,
    convert: impl FnOnce(&Payload) -> Result<T, Fault>,
) -> Result<Option<T>, Fault> {
    match map.get(key) {
        Some(entry) => as_object(entry, key).and_then(convert).map(Some),
        None => Ok(None),
    }
}
