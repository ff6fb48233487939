//! Text of the generated build script, CI config and sample test.
//!
//! Rendering is pure: the same context always yields the same text.

use crate::defaults::Defaults;
use crate::utils::template::{self, TemplateVars};

/// Values substituted into the templates.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    /// Base name of the test directory, e.g. `test`.
    pub test_dir: &'a str,
    pub python_version: &'a str,
    pub tenant_url: &'a str,
}

impl<'a> TemplateContext<'a> {
    pub fn new(test_dir: &'a str, defaults: &'a Defaults) -> Self {
        Self {
            test_dir,
            python_version: &defaults.python_version,
            tenant_url: &defaults.tenant_url,
        }
    }

    fn vars(&self) -> [(&'static str, &'a str); 3] {
        [
            (TemplateVars::TEST_DIR, self.test_dir),
            (TemplateVars::PYTHON_VERSION, self.python_version),
            (TemplateVars::TENANT_URL, self.tenant_url),
        ]
    }
}

const TRAVIS_YML: &str = r#"env:
 global:

    ## Fill environment variables:
    ## (You may secure your keys using: http://about.travis-ci.org/docs/user/encryption-keys/)

    - "QUBELL_TENANT={{tenant_url}}"
    ## QUBELL_USER, QUBELL_PASSWORD
    ## - These are for Qubell authentication, use user with Basic auth

    ## PROVIDER_NAME, PROVIDER_TYPE, PROVIDER_REGION, PROVIDER_IDENTITY, PROVIDER_CREDENTIAL
    ## - These are for Cloud Account setting, when you need to provision virtual machines
    ## - Identity and Credential must be secured

    ## ARTIFACTS_AWS_REGION, ARTIFACTS_S3_BUCKET, ARTIFACTS_AWS_ACCESS_KEY_ID, ARTIFACTS_AWS_SECRET_ACCESS_KEY
    ## - These are for publishing Cookbooks
    ## - Access Key Id and Secret Access Key must be secured

    ## GIT_NAME, GIT_EMAIL, GH_TOKEN
    ## - These are for push back to github of verified cookbooks
    ## - All must be secured

language: python
python:
  - "{{python_version}}"

install: "pip install -r {{test_dir}}/requirements.txt"

before_script:
   - gem install travis-artifacts --no-ri --no-rdoc
   - git submodule update --init --recursive

script: ./build.sh
"#;

const BUILD_SH: &str = r#"#!/bin/bash

REPO_NAME=$(echo ${TRAVIS_REPO_SLUG} | cut -d/ -f2)
OWNER_NAME=$(echo ${TRAVIS_REPO_SLUG} | cut -d/ -f1)
GIT_REVISION=$(git log --pretty=format:'%h' -n 1)
LAST_COMMIT_AUTHOR=$(git log --pretty=format:'%an' -n1)

function check {
    "$@"
    status=$?
    if [ $status -ne 0 ]; then
        echo "error run $@"
        exit $status
    fi
    return $status
}

function package {
    local REVISION=$1

    tar -czf ${REPO_NAME}-cookbooks-${REVISION}.tar.gz cookbooks
}

function publish {
    local REVISION=$1

    package $REVISION

    travis-artifacts upload --path ${REPO_NAME}-cookbooks-${REVISION}.tar.gz --target-path ${OWNER_NAME}/
}

function replace {
    local REVISION=$1

    check sed -i.bak -e 's/'${REPO_NAME}'-cookbooks-stable-[[:alnum:]]*.tar.gz/'${REPO_NAME}'-cookbooks-'${REVISION}'.tar.gz/g' ${REPO_NAME}.yml
    cat ${REPO_NAME}.yml
}

function publish_github {
    GIT_URL=$(git config remote.origin.url)
    NEW_GIT_URL=$(echo $GIT_URL | sed -e 's/^git:/https:/g' | sed -e 's/^https:\/\//https:\/\/'${GH_TOKEN}':@/')

    git remote rm origin
    git remote add origin ${NEW_GIT_URL}
    git fetch -q
    git config user.name ${GIT_NAME}
    git config user.email ${GIT_EMAIL}
    rm -rf *.tar.gz
    git commit -a -m "CI: Success build ${TRAVIS_BUILD_NUMBER} [skip ci]"
    git checkout -b build
    git push -q origin build:master
}

if [[ ${TRAVIS_PULL_REQUEST} == "false" ]]; then
    if [[ ${LAST_COMMIT_AUTHOR} != "CI" ]]; then
        publish "stable-${GIT_REVISION}"
        replace "stable-${GIT_REVISION}"

        pushd {{test_dir}}

        check python test_runner.py

        popd

        publish_github
    fi
fi
"#;

const TEST_EXAMPLE_PY: &str = r#"import os

from test_runner import BaseComponentTestCase
from qubell.api.private.testing import instance, environment, workflow, values


@environment({
    "default": {}
})
class ComponentTestCase(BaseComponentTestCase):
    name = "name-component"
    apps = [{
        "name": name,
        "file": os.path.realpath(os.path.join(os.path.dirname(__file__), '../%s.yml' % name))
    }]

    def test_fail(self):
        assert Fail, "Test is not implemented, start to write your tests here"

    def test_pass(self):
        assert True, "Just another test, that passes"
"#;

/// `.travis.yml` for the component.
pub fn travis_yml(ctx: &TemplateContext<'_>) -> String {
    template::render(TRAVIS_YML, &ctx.vars())
}

/// `build.sh` run by CI: publishes cookbooks, runs the suite, pushes the build branch.
pub fn build_sh(ctx: &TemplateContext<'_>) -> String {
    template::render(BUILD_SH, &ctx.vars())
}

pub fn test_example() -> &'static str {
    TEST_EXAMPLE_PY
}
